use thiserror::Error;

#[derive(Debug, Error)]
pub enum WmError {
    #[error(transparent)]
    X11(#[from] X11Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("protocol error {error_code} on request {request_code}")]
    Protocol { request_code: u8, error_code: u8 },
}

#[derive(Debug, Error)]
pub enum X11Error {
    #[error(transparent)]
    Connect(#[from] x11rb::errors::ConnectError),
    #[error(transparent)]
    Connection(#[from] x11rb::errors::ConnectionError),
    #[error("X11 error reply: {0:?}")]
    Reply(x11rb::x11_utils::X11Error),
    #[error("ran out of X11 resource ids")]
    IdsExhausted,
    #[error("another window manager is already running")]
    AnotherWmRunning,
    #[error("cannot open display")]
    DisplayOpenFailed,
    #[error("cannot load font: {0}")]
    FontLoadFailed(String),
    #[error("cannot create Xft draw context")]
    DrawCreateFailed,
}

impl From<x11rb::errors::ReplyError> for X11Error {
    fn from(value: x11rb::errors::ReplyError) -> Self {
        match value {
            x11rb::errors::ReplyError::ConnectionError(e) => Self::Connection(e),
            x11rb::errors::ReplyError::X11Error(e) => Self::Reply(e),
        }
    }
}

impl From<x11rb::errors::ReplyOrIdError> for X11Error {
    fn from(value: x11rb::errors::ReplyOrIdError) -> Self {
        match value {
            x11rb::errors::ReplyOrIdError::IdsExhausted => Self::IdsExhausted,
            x11rb::errors::ReplyOrIdError::ConnectionError(e) => Self::Connection(e),
            x11rb::errors::ReplyOrIdError::X11Error(e) => Self::Reply(e),
        }
    }
}

impl From<x11rb::errors::ConnectError> for WmError {
    fn from(value: x11rb::errors::ConnectError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ConnectionError> for WmError {
    fn from(value: x11rb::errors::ConnectionError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ReplyError> for WmError {
    fn from(value: x11rb::errors::ReplyError) -> Self {
        Self::X11(value.into())
    }
}

impl From<x11rb::errors::ReplyOrIdError> for WmError {
    fn from(value: x11rb::errors::ReplyOrIdError) -> Self {
        Self::X11(value.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lua error: {0}")]
    Lua(#[from] mlua::Error),
    #[error("invalid modifier '{0}'")]
    InvalidModkey(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("invalid color '{0}'")]
    InvalidColor(String),
    #[error("cannot read config: {0}")]
    CouldNotReadConfig(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MainError {
    #[error("usage: tagwm [-v] [--config <path>]")]
    InvalidArguments,
    #[error("no program name in argv")]
    NoProgramName,
    #[error("no config directory on this system")]
    NoConfigDir,
    #[error("--config needs a path")]
    NoConfigPath,
    #[error("config file does not exist")]
    BadConfigPath,
    #[error("cannot check config path: {0}")]
    FailedCheckExist(std::io::Error),
    #[error("cannot read config: {0}")]
    FailedReadConfig(std::io::Error),
    #[error("built-in config is broken: {0}")]
    FailedReadConfigTemplate(ConfigError),
    #[error("could not start: {0}")]
    CouldNotStartWm(WmError),
    #[error(transparent)]
    WmError(WmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_names_both_codes() {
        let err = WmError::Protocol {
            request_code: 42,
            error_code: 8,
        };
        assert_eq!(err.to_string(), "protocol error 8 on request 42");
    }

    #[test]
    fn another_wm_is_reported_through_main_error() {
        let err = MainError::CouldNotStartWm(WmError::X11(X11Error::AnotherWmRunning));
        assert!(err.to_string().contains("another window manager"));
    }
}
