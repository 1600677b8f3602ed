use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Unsupported shell detected ({0:?}). Only bash and zsh are supported.")]
    Unsupported(String),

    #[error("SHELL is not set; pass --shell bash|zsh")]
    Unset,
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("{stage} failed")]
    Stage {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("no answer received for {0:?} (input closed)")]
    PromptClosed(String),
}
