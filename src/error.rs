use termwiz::Error as TermwizError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("terminal error: {0}")]
    Terminal(#[from] TermwizError),
    #[error("render error: {0}")]
    Render(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to format terminal output")]
    Fmt(#[from] std::fmt::Error),
}

impl ProgramError {
    pub fn terminal(error: TermwizError) -> Self {
        Self::Terminal(error)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    pub fn layout(message: impl Into<String>) -> Self {
        Self::Layout(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<taffy::TaffyError> for ProgramError {
    fn from(error: taffy::TaffyError) -> Self {
        Self::Layout(error.to_string())
    }
}
