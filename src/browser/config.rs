use std::path::PathBuf;

/// Options for launching a local browser instance.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Run without a visible window.
    pub headless: bool,

    /// Browser window width in pixels.
    pub window_width: u32,

    /// Browser window height in pixels.
    pub window_height: u32,

    /// Path to the Chrome/Chromium binary. Auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,

    /// User data directory for the browser profile.
    pub user_data_dir: Option<PathBuf>,

    /// Enable the Chrome sandbox.
    pub sandbox: bool,
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set headless mode.
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Builder method: set window size.
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Builder method: set the Chrome binary path.
    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    /// Builder method: set the user data directory.
    pub fn user_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_data_dir = Some(dir.into());
        self
    }

    /// Builder method: set sandbox mode.
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1366,
            window_height: 900,
            chrome_path: None,
            user_data_dir: None,
            sandbox: true,
        }
    }
}

/// Options for attaching to an already-running browser over WebSocket.
/// Whether to launch locally or connect remotely is a deployment choice,
/// not engine behavior.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// WebSocket debugger URL, e.g. `ws://chrome-grid:9222/devtools/browser/...`.
    pub ws_url: String,
}

impl ConnectionOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }
}
