//! Desktop host capabilities: alerts through `notify-send` (Linux) or
//! `osascript` (macOS), URLs through the platform opener

use std::process::Stdio;

use tokio::process::{Child, Command};

use crate::presenter::{AlertPresenter, ClickHandler, Navigator, PresentationRequest};

const APP_NAME: &str = "HA Notify";

/// Action key `notify-send --wait` prints when the alert body is clicked
const DEFAULT_ACTION: &str = "default";

/// Shows alerts by running the desktop notification command
///
/// Every alert process is awaited on a background task. On Linux the alert
/// is sent with `--wait` and a default action, so a click comes back on
/// stdout and runs the request's click handler. `osascript` cannot report
/// clicks, so on macOS the handler is dropped.
#[derive(Debug, Clone)]
pub struct DesktopPresenter {
    program: String,
    leading_args: Vec<String>,
}

impl Default for DesktopPresenter {
    fn default() -> Self {
        let program = if cfg!(target_os = "macos") {
            "osascript"
        } else {
            "notify-send"
        };
        Self::with_command(program, Vec::new())
    }
}

impl DesktopPresenter {
    /// Run `program` with `leading_args` placed before the alert arguments
    pub fn with_command(program: impl Into<String>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn alert_args(&self, request: &PresentationRequest) -> Vec<String> {
        let mut args = vec![
            format!("--app-name={}", APP_NAME),
            format!("--expire-time={}", request.duration.as_millis()),
        ];
        if request.on_click.is_some() {
            args.push(format!("--action={}=Open", DEFAULT_ACTION));
            args.push("--wait".to_string());
        }
        args.push(request.title.clone());
        args.push(request.body.clone());
        args
    }

    #[cfg(target_os = "macos")]
    fn alert_args(&self, request: &PresentationRequest) -> Vec<String> {
        vec![
            "-e".to_string(),
            format!(
                "display notification \"{}\" with title \"{}\" subtitle \"{}\"",
                escape_applescript(&request.body),
                APP_NAME,
                escape_applescript(&request.title)
            ),
        ]
    }
}

impl AlertPresenter for DesktopPresenter {
    fn present(&self, request: PresentationRequest) -> crate::Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            crate::NotifyError::Presenter(format!("Desktop alerts need a tokio runtime: {}", e))
        })?;

        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(self.alert_args(&request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                crate::NotifyError::Presenter(format!("Failed to run {}: {}", self.program, e))
            })?;

        let on_click = if cfg!(target_os = "macos") {
            if request.on_click.is_some() {
                tracing::debug!("osascript alerts cannot route clicks, ignoring click handler");
            }
            None
        } else {
            request.on_click
        };

        runtime.spawn(await_alert(self.program.clone(), child, on_click));
        Ok(())
    }
}

/// Reap the alert process and run the click handler if the user clicked
async fn await_alert(program: String, child: Child, on_click: Option<ClickHandler>) {
    let output = match child.wait_with_output().await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!("Failed to wait for {}: {}", program, e);
            return;
        }
    };
    if !output.status.success() {
        tracing::debug!("{} exited with {}", program, output.status);
    }

    let clicked = String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.trim() == DEFAULT_ACTION);
    if let (true, Some(handler)) = (clicked, on_click) {
        handler.click().await;
    }
}

/// Opens URLs with the platform's default handler
#[derive(Debug, Default)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open(&self, url: &str) -> crate::Result<()> {
        tracing::debug!("Opening {}", url);
        open::that_detached(url)
            .map_err(|e| crate::NotifyError::Presenter(format!("Failed to open {}: {}", url, e)))
    }
}

#[cfg(target_os = "macos")]
fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
