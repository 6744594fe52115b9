//! Notification transports.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use chrono::Local;
use loris_core::Notifier;
use loris_model::{MailConfig, NotifyError};
use tracing::{debug, info};

/// Delivers mail by piping a message to a local `sendmail -t -i`.
#[derive(Debug, Clone)]
pub struct SendmailNotifier {
    program: PathBuf,
    from: String,
}

impl SendmailNotifier {
    pub fn new(program: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            from: from.into(),
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(&config.sendmail_path, &config.from)
    }
}

impl Notifier for SendmailNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        validate_recipient(recipient)?;
        let message = compose_message(
            &self.from,
            recipient,
            subject,
            body,
            &Local::now().to_rfc2822(),
        );
        let spawn_error = |source| NotifyError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(message.as_bytes()).map_err(spawn_error)?;
        }
        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(NotifyError::Transport {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(recipient = %recipient, program = %self.program.display(), "message handed to sendmail");
        Ok(())
    }
}

/// Logs notifications instead of sending them (mail disabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, recipient: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        validate_recipient(recipient)?;
        info!(recipient = %recipient, subject = %subject, "mail disabled, notification logged only");
        Ok(())
    }
}

/// Pick the transport for the `mail` configuration section.
pub fn notifier_from_config(config: &MailConfig) -> Box<dyn Notifier> {
    if config.enabled {
        Box::new(SendmailNotifier::from_config(config))
    } else {
        Box::new(LogNotifier)
    }
}

/// Reject addresses that could inject headers or are obviously malformed.
pub fn validate_recipient(recipient: &str) -> Result<(), NotifyError> {
    let well_formed = recipient
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty())
        && !recipient.chars().any(|ch| ch.is_whitespace() || ch.is_control());
    if well_formed {
        Ok(())
    } else {
        Err(NotifyError::InvalidRecipient(recipient.to_string()))
    }
}

/// Build a plain-text RFC 5322 message.
pub fn compose_message(from: &str, to: &str, subject: &str, body: &str, date: &str) -> String {
    let subject = subject.replace(['\r', '\n'], " ");
    format!(
        "From: {from}\r\nTo: {to}\r\nSubject: {subject}\r\nDate: {date}\r\n\
         MIME-Version: 1.0\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
        body.replace('\n', "\r\n").trim_end()
    )
}
