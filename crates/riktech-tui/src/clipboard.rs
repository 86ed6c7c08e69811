use std::io::Write;
use std::process::{Command, Stdio};

/// Clipboard commands tried in order; the first one that runs wins.
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
];

/// Hand `text` to the platform clipboard. Returns false if no command worked.
pub fn copy_to_clipboard(text: &str) -> bool {
    CLIPBOARD_COMMANDS
        .iter()
        .any(|(program, args)| pipe_to(program, args, text))
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> bool {
    let Ok(mut child) = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    // stdin is dropped at the end of this block so the command sees EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()).is_ok(),
        None => true,
    };

    // Always reap the child, even when the write failed
    match child.wait() {
        Ok(status) => written && status.success(),
        Err(e) => {
            tracing::debug!(program = %program, error = %e, "clipboard command failed");
            false
        }
    }
}
