use std::{error::Error as StdError, fmt};

use backtrace::Backtrace;
use thiserror::Error;

pub trait ErrorCode: StdError + 'static {
    fn code(&self) -> &'static str;
}

#[derive(Error, Debug)]
pub enum Code {
    #[error(transparent)]
    Any(#[from] anyhow::Error),
    #[error("Not found. {0}")]
    NotFound(String),
    #[error("Please recheck the request.see: {0}")]
    Validates(#[source] validator::ValidationErrors),
    #[error("Please recheck the request.see: {0}")]
    BadRequest(String),
    #[error("Failed to fetch {kind}. {detail}")]
    Fetch { kind: &'static str, detail: String },
    #[error("Failed to create {kind}. {detail}")]
    Create { kind: &'static str, detail: String },
    #[error("Failed to update {kind} {id}. {detail}")]
    Update {
        kind: &'static str,
        id: String,
        detail: String,
    },
    #[error("Failed to delete {kind} {ids:?}. {detail}")]
    Delete {
        kind: &'static str,
        ids: Vec<String>,
        detail: String,
    },
    #[error("Failed to add users {user_ids:?} to group {group_id}. {detail}")]
    AddMembership {
        group_id: String,
        user_ids: Vec<String>,
        detail: String,
    },
    #[error("Failed to remove user {user_id} from group {group_id}. {detail}")]
    RemoveMembership {
        group_id: String,
        user_id: String,
        detail: String,
    },
}

impl ErrorCode for Code {
    fn code(&self) -> &'static str {
        match self {
            Self::Any(_) => "2010001",
            Self::NotFound(_) => "2010002",
            Self::Validates(_) => "2010003",
            Self::BadRequest(_) => "2010004",
            Self::Fetch { .. } => "2010005",
            Self::Create { .. } => "2010006",
            Self::Update { .. } => "2010007",
            Self::Delete { .. } => "2010008",
            Self::AddMembership { .. } => "2010009",
            Self::RemoveMembership { .. } => "2010010",
        }
    }
}

pub struct WithBacktrace {
    source: Code,
    backtrace: Backtrace,
}

impl WithBacktrace {
    pub fn source_code(&self) -> &Code {
        &self.source
    }
}

impl fmt::Debug for WithBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithBacktrace")
            .field("source", &self.source)
            .field("backtrace", &self.backtrace)
            .finish()
    }
}

impl fmt::Display for WithBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl StdError for WithBacktrace {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.source)
    }
}

impl From<Code> for WithBacktrace {
    fn from(code: Code) -> Self {
        WithBacktrace {
            source: code,
            backtrace: Backtrace::new(),
        }
    }
}

impl From<WithBacktrace> for Code {
    fn from(value: WithBacktrace) -> Self {
        value.source
    }
}

impl PartialEq for WithBacktrace {
    fn eq(&self, other: &Self) -> bool {
        self.source.code() == other.source.code()
    }
}

#[inline]
pub fn any<E: StdError>(err: E) -> WithBacktrace {
    Code::Any(anyhow::anyhow!("{}", err.to_string())).into()
}

#[inline]
pub fn not_found<S: ToString + ?Sized>(err: &S) -> WithBacktrace {
    Code::NotFound(err.to_string()).into()
}

#[inline]
pub fn bad_request<S: ToString + ?Sized>(err: &S) -> WithBacktrace {
    Code::BadRequest(err.to_string()).into()
}

#[inline]
pub fn validates(err: validator::ValidationErrors) -> WithBacktrace {
    Code::Validates(err).into()
}

#[inline]
pub fn fetch<S: ToString + ?Sized>(
    kind: &'static str,
    detail: &S,
) -> WithBacktrace {
    Code::Fetch {
        kind,
        detail: detail.to_string(),
    }
    .into()
}

#[inline]
pub fn create<S: ToString + ?Sized>(
    kind: &'static str,
    detail: &S,
) -> WithBacktrace {
    Code::Create {
        kind,
        detail: detail.to_string(),
    }
    .into()
}

#[inline]
pub fn update<S: ToString + ?Sized>(
    kind: &'static str,
    id: &str,
    detail: &S,
) -> WithBacktrace {
    Code::Update {
        kind,
        id: id.to_owned(),
        detail: detail.to_string(),
    }
    .into()
}

#[inline]
pub fn delete<S: ToString + ?Sized>(
    kind: &'static str,
    ids: Vec<String>,
    detail: &S,
) -> WithBacktrace {
    Code::Delete {
        kind,
        ids,
        detail: detail.to_string(),
    }
    .into()
}

#[inline]
pub fn add_membership<S: ToString + ?Sized>(
    group_id: &str,
    user_ids: Vec<String>,
    detail: &S,
) -> WithBacktrace {
    Code::AddMembership {
        group_id: group_id.to_owned(),
        user_ids,
        detail: detail.to_string(),
    }
    .into()
}

#[inline]
pub fn remove_membership<S: ToString + ?Sized>(
    group_id: &str,
    user_id: &str,
    detail: &S,
) -> WithBacktrace {
    Code::RemoveMembership {
        group_id: group_id.to_owned(),
        user_id: user_id.to_owned(),
        detail: detail.to_string(),
    }
    .into()
}
