//! 错误类型：所有 `zle` 操作共享的失败种类

/// 对外可见的失败分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Protected,
    EditorInactive,
    BadArgument,
    UnsupportedWidget,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZleError {
    #[error("no such widget `{0}'")]
    NoSuchWidget(String),

    #[error("no such keymap `{0}'")]
    NoSuchKeymap(String),

    #[error("widget name `{0}' is protected")]
    Protected(String),

    #[error("widgets can only be called when ZLE is active")]
    EditorInactive,

    #[error("can only be called from widget function")]
    NotInWidget,

    #[error("incompatible operation selection options")]
    IncompatibleOptions,

    #[error("not enough arguments for -{0}")]
    NotEnoughArguments(String),

    #[error("too many arguments for -{0}")]
    TooManyArguments(String),

    #[error("number expected after -{0}")]
    NumberExpected(char),

    #[error("bad numeric argument `{0}'")]
    BadNumber(String),

    #[error("keymap expected after -{0}")]
    KeymapExpected(char),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("Bad file descriptor number for -F: {0}")]
    BadFd(String),

    #[error("No handler installed for fd {0}")]
    NoFdHandler(i32),

    #[error("widget name `{0}' may not begin with `.'")]
    DottedName(String),

    #[error("internal widget `{0}' is already defined")]
    InternalExists(String),

    #[error("invalid widget `{0}'")]
    InvalidWidget(String),
}

impl ZleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZleError::NoSuchWidget(_) | ZleError::NoSuchKeymap(_) | ZleError::NoFdHandler(_) => {
                ErrorKind::NotFound
            }
            ZleError::Protected(_) | ZleError::InternalExists(_) => ErrorKind::Protected,
            ZleError::EditorInactive | ZleError::NotInWidget => ErrorKind::EditorInactive,
            ZleError::IncompatibleOptions
            | ZleError::NotEnoughArguments(_)
            | ZleError::TooManyArguments(_)
            | ZleError::NumberExpected(_)
            | ZleError::BadNumber(_)
            | ZleError::KeymapExpected(_)
            | ZleError::UnknownOption(_)
            | ZleError::BadFd(_)
            | ZleError::DottedName(_) => ErrorKind::BadArgument,
            ZleError::InvalidWidget(_) => ErrorKind::UnsupportedWidget,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZleError>;

#[cfg(test)]
#[path = "../../tests/unit/core/error.rs"]
mod tests;
