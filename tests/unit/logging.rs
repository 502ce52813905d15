use super::*;

#[test]
fn ui_writer_sends_lines_on_drop() {
    let (tx, rx) = mpsc::channel();
    {
        let mut writer = UiLogWriter::new(tx);
        writer.write_all(b"first line\nsecond ").unwrap();
        writer.write_all(b"line\n").unwrap();
        assert!(rx.try_recv().is_err());
    }
    let lines: Vec<String> = rx.try_iter().collect();
    assert_eq!(lines, vec!["first line", "second line"]);
}

#[test]
fn empty_ui_writer_sends_nothing() {
    let (tx, rx) = mpsc::channel::<String>();
    drop(UiLogWriter::new(tx));
    assert!(rx.try_recv().is_err());
}

#[test]
fn default_log_dir_is_app_scoped() {
    let dir = default_log_dir();
    assert!(dir.ends_with("sccontrol/logs"));
}
