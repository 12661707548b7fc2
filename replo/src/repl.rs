//! Driver loop connecting a [`Frontend`] to a [`Session`].

use anyhow::Result;
use tracing::{debug, info, instrument};

use crate::frontend::{Frontend, Trigger};
use crate::io::backend::Backend;
use crate::session::Session;

/// Run the interactive loop until the frontend asks to quit.
///
/// The buffer starts from history (or the baseline imports) and is saved back
/// on quit. Executions block the loop, so at most one is ever in flight.
#[instrument(skip_all, fields(skip_history = session.skip_history, debug = session.debug))]
pub fn run<B, F>(session: &mut Session, backend: &B, frontend: &mut F) -> Result<()>
where
    B: Backend + ?Sized,
    F: Frontend + ?Sized,
{
    let initial = session.load_history();
    frontend.seed(&initial)?;
    info!("session started");

    loop {
        let trigger = frontend.next_trigger()?;
        debug!(?trigger, "trigger");
        match trigger {
            Trigger::Execute => execute(session, backend, frontend)?,
            Trigger::Clear => session.clear(),
            Trigger::Reset => {
                session.reset();
                let seed = session.seed_buffer();
                frontend.seed(&seed)?;
            }
            Trigger::Quit => {
                session.save_history(&frontend.buffer());
                info!("session finished");
                return Ok(());
            }
        }
    }
}

/// Execute the current buffer and show the result.
///
/// Errors and program output go to the same output stream: the error text
/// first, then whatever bytes the run produced.
fn execute<B, F>(session: &mut Session, backend: &B, frontend: &mut F) -> Result<()>
where
    B: Backend + ?Sized,
    F: Frontend + ?Sized,
{
    frontend.clear_output()?;
    let buffer = frontend.buffer();
    let result = session.execute(backend, &buffer, frontend.diagnostics());
    match result {
        Ok(execution) => {
            if let Some(error) = execution.error() {
                frontend.show_output(format!("{error}\n").as_bytes())?;
            }
            frontend.show_output(&execution.output)?;
            let notice = execution.truncated_notice();
            if !notice.is_empty() {
                frontend.show_output(notice.as_bytes())?;
            }
        }
        Err(err) => frontend.show_output(format!("{err:#}\n").as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Execution;
    use crate::frontend::LineFrontend;
    use crate::session::SessionOptions;
    use std::io::Cursor;
    use crate::test_support::{ScriptedBackend, ScriptedFrontend};

    #[test]
    fn quit_saves_full_buffer() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("h.replo");
        let mut session = Session::new(SessionOptions {
            history_path: Some(path.clone()),
            ..SessionOptions::default()
        });
        let backend = ScriptedBackend::echo_source();
        let mut frontend = ScriptedFrontend::new(vec![
            (Some("x := 1\n"), Trigger::Execute),
            (Some("println(x)\n"), Trigger::Quit),
        ]);

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(
            std::fs::read_to_string(&path).expect("history"),
            "import \"fmt\"\nx := 1\nprintln(x)\n"
        );
    }

    #[test]
    fn error_text_precedes_output() {
        let mut session = Session::new(SessionOptions::default());
        let backend = ScriptedBackend::new(vec![Ok(Execution::failed("boom\n", Some(2)))]);
        let mut frontend =
            ScriptedFrontend::new(vec![(None, Trigger::Execute), (None, Trigger::Quit)]);

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(frontend.output_text(), "exit status 2\nboom\n");
    }

    #[test]
    fn setup_error_is_shown_and_loop_continues() {
        let mut session = Session::new(SessionOptions::default());
        let backend = ScriptedBackend::new(vec![
            Err(anyhow::anyhow!("create staging dir")),
            Ok(Execution::success("ok\n")),
        ]);
        let mut frontend = ScriptedFrontend::new(vec![
            (None, Trigger::Execute),
            (None, Trigger::Execute),
            (None, Trigger::Quit),
        ]);

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(frontend.output_text(), "create staging dir\nok\n");
    }

    #[test]
    fn reset_reseeds_buffer() {
        let mut session = Session::new(SessionOptions::default());
        let backend = ScriptedBackend::echo_source();
        let mut frontend = ScriptedFrontend::new(vec![
            (Some("x := 1\n"), Trigger::Reset),
            (None, Trigger::Quit),
        ]);

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(frontend.buffer(), "import \"fmt\"\n");
        assert!(session.statements().is_empty());
    }

    #[test]
    fn debug_run_writes_staged_source_to_diagnostics() {
        let mut session = Session::new(SessionOptions {
            debug: true,
            ..SessionOptions::default()
        });
        let backend = ScriptedBackend::new(vec![Ok(Execution::success("1\n"))]);
        let mut frontend = ScriptedFrontend::new(vec![
            (Some("x := 1\nprintln(x)\n"), Trigger::Execute),
            (None, Trigger::Quit),
        ]);

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(frontend.diagnostics_text(), backend.sources()[0]);
        assert!(
            frontend
                .diagnostics_text()
                .contains("func main() {\nx := 1\nprintln(x)\n")
        );
        assert_eq!(frontend.output_text(), "1\n");
    }

    #[test]
    fn invalid_utf8_input_does_not_end_session() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("h.replo");
        let mut session = Session::new(SessionOptions {
            history_path: Some(path.clone()),
            ..SessionOptions::default()
        });
        let backend = ScriptedBackend::echo_source();
        let mut frontend = LineFrontend::new(
            Cursor::new(b"x := 1\ns := \"\xff\"\n:run\n:q\n".to_vec()),
            Vec::new(),
            Vec::new(),
        )
        .without_prompt();

        run(&mut session, &backend, &mut frontend).expect("run");

        assert_eq!(session.statements(), ["x := 1", "s := \"\u{FFFD}\"", ""]);
        assert_eq!(
            std::fs::read_to_string(&path).expect("history"),
            "import \"fmt\"\nx := 1\ns := \"\u{FFFD}\"\n"
        );
    }
}
