use std::fs;

use compass_cli::framework_manager::ContentState;
use compass_cli::shell::{Command, Flow, Shell, ShellEvent};
use compass_lib::{ApiClient, ApiMode};
use tempfile::TempDir;

fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("frameworks.json"),
        r#"{"data":[
            {"id":"iso","name":"ISO 27001","shortName":"ISO","status":"Active"},
            {"id":7,"name":"PCI DSS","shortName":"PCI"}
        ]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("iso.json"),
        r#"[
            {"controlId":"A.5.1","controlCategory":"Policies","controlDescription":"Information security policies"},
            {"controlId":"A.8.2","controlCategory":"Assets","controlDescription":"Classification"},
            {"controlId":"A.9.1","controlCategory":"Access","controlDescription":"Access control policy"}
        ]"#,
    )
    .unwrap();
    fs::write(dir.path().join("7.json"), r#"{"rows":[]}"#).unwrap();
    dir
}

fn shell(dir: &TempDir) -> Shell<Vec<u8>> {
    let api = ApiClient::builder()
        .mode(ApiMode::Json)
        .json_base(dir.path().to_string_lossy())
        .build()
        .unwrap();
    Shell::new(api, 2, Vec::new())
}

fn output(shell: &Shell<Vec<u8>>) -> String {
    String::from_utf8_lossy(shell.out()).into_owned()
}

async fn pump(shell: &mut Shell<Vec<u8>>) {
    let event = shell.next_event().await.unwrap();
    shell.handle_event(event).unwrap();
}

#[tokio::test]
async fn test_list_then_open_framework() {
    let dir = fixtures();
    let mut shell = shell(&dir);

    shell.execute(Command::List).await.unwrap();
    pump(&mut shell).await;
    assert_eq!(shell.manager().frameworks().len(), 2);
    assert!(output(&shell).contains("iso  ISO 27001  [Active]"));

    shell.execute(Command::Open("/framework/iso".into())).await.unwrap();
    assert_eq!(
        shell.manager().content(),
        &ContentState::Loading("iso".into())
    );
    pump(&mut shell).await;

    assert_eq!(shell.manager().content(), &ContentState::Table);
    assert_eq!(shell.manager().header().title, "ISO 27001");
    assert_eq!(shell.manager().history(), ["/framework/iso"]);
    let text = output(&shell);
    assert!(text.contains("Showing 1 to 2 of 3 entries"));
    assert!(text.contains("(Previous) [1] 2 Next"));

    shell.execute(Command::Next).await.unwrap();
    assert_eq!(shell.manager().table().current_page(), 2);
    shell.execute(Command::Search("access".into())).await.unwrap();
    assert_eq!(shell.manager().table().filtered_len(), 1);
    assert_eq!(shell.manager().table().current_page(), 1);
}

#[tokio::test]
async fn test_empty_framework_shows_no_data() {
    let dir = fixtures();
    let mut shell = shell(&dir);

    shell.execute(Command::Open("7".into())).await.unwrap();
    pump(&mut shell).await;
    assert_eq!(shell.manager().content(), &ContentState::NoData);
    assert!(output(&shell).contains("No control items for this framework"));
}

#[tokio::test]
async fn test_missing_framework_shows_error() {
    let dir = fixtures();
    let mut shell = shell(&dir);

    shell.execute(Command::Open("nist".into())).await.unwrap();
    pump(&mut shell).await;
    assert!(matches!(shell.manager().content(), ContentState::Error(_)));
}

#[tokio::test]
async fn test_newer_open_supersedes_older() {
    let dir = fixtures();
    let mut shell = shell(&dir);

    shell.execute(Command::Open("7".into())).await.unwrap();
    shell.execute(Command::Open("iso".into())).await.unwrap();

    // Both fetches report back; only the latest lands in the table.
    for _ in 0..2 {
        let event = shell.next_event().await.unwrap();
        if let ShellEvent::Rows { ticket, .. } = &event {
            assert!(["7", "iso"].contains(&ticket.framework_id()));
        }
        shell.handle_event(event).unwrap();
    }
    assert_eq!(shell.manager().active_id(), Some("iso"));
    assert_eq!(shell.manager().content(), &ContentState::Table);
    assert_eq!(shell.manager().table().data().len(), 3);
}

#[tokio::test]
async fn test_wizard_flow() {
    let dir = fixtures();
    let template = dir.path().join("controls.json");
    fs::write(
        &template,
        r#"[{"controlId":"CC1.1","controlCategory":"Environment","controlDescription":"Integrity"}]"#,
    )
    .unwrap();
    let mut shell = shell(&dir);

    shell.execute(Command::Set { field: "name".into(), value: "x".into() }).await.unwrap();
    assert!(output(&shell).contains("No wizard open"));

    shell.execute(Command::New).await.unwrap();
    shell.execute(Command::Step("next".into())).await.unwrap();
    assert_eq!(shell.modal().current_step(), Some(1));

    for (field, value) in [("name", "SOC 2"), ("shortName", "SOC2")] {
        let command = Command::Set { field: field.into(), value: value.into() };
        shell.execute(command).await.unwrap();
    }
    shell.execute(Command::Step("next".into())).await.unwrap();
    assert_eq!(shell.modal().current_step(), Some(2));

    shell.execute(Command::Template(template)).await.unwrap();
    assert!(output(&shell).contains("Read 1 control items"));

    shell.execute(Command::Submit).await.unwrap();
    assert!(output(&shell).contains("Framework created (local-"));
    assert!(!shell.modal().is_open());
}

#[tokio::test]
async fn test_quit_and_run_loop() {
    let dir = fixtures();
    let mut shell = shell(&dir);
    assert_eq!(shell.execute(Command::Quit).await.unwrap(), Flow::Quit);

    let input: &[u8] = b"help\nbogus\nquit\nlist\n";
    shell.run(input).await.unwrap();
    let text = output(&shell);
    assert!(text.contains("New framework:"));
    assert!(text.contains("unknown command 'bogus'"));
    assert!(!text.contains("Loading frameworks"));
}
