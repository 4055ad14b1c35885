//! Route table mapping method + path to a typed [`Operation`]
//!
//! Rules are tried in table order. A rule restricted to one verb is skipped
//! for every other verb; any other rule that matches the path is final, and an
//! unsupported verb on it is [`RouteError::MethodNotAllowed`]. The identifier
//! is parsed before the verb is checked, so a bad id wins over a bad verb.

use axum::http::Method;
use qa_core::{AnswerId, QuestionId};
use std::fmt;
use thiserror::Error;

/// What a request asks the service to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListQuestions,
    CreateQuestion,
    GetQuestion(QuestionId),
    DeleteQuestion(QuestionId),
    /// Create an answer under the question named in the path
    CreateAnswer(QuestionId),
    GetAnswer(AnswerId),
    DeleteAnswer(AnswerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Question,
    Answer,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Question => write!(f, "question"),
            Resource::Answer => write!(f, "answer"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Invalid {0} ID")]
    InvalidIdentifier(Resource),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Route not found")]
    NoRoute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Delete,
    Other,
}

impl From<&Method> for Verb {
    fn from(method: &Method) -> Self {
        if *method == Method::GET {
            Verb::Get
        } else if *method == Method::POST {
            Verb::Post
        } else if *method == Method::DELETE {
            Verb::Delete
        } else {
            Verb::Other
        }
    }
}

/// Shape of the path below a rule's root (slashes trimmed)
#[derive(Debug, Clone, Copy)]
enum Shape {
    /// Nothing below the root
    Collection,
    /// First segment is the identity; an empty remainder is a bad identity
    Member,
    /// Contains the named child segment; the identity is the first segment
    /// before it
    Nested(&'static str),
}

enum Capture<'a> {
    Bare,
    Id(&'a str),
}

impl Shape {
    fn capture(self, rest: &str) -> Option<Capture<'_>> {
        match self {
            Shape::Collection => rest.is_empty().then_some(Capture::Bare),
            Shape::Member => Some(Capture::Id(first_segment(rest))),
            Shape::Nested(child) => {
                let at = rest.split('/').position(|segment| segment == child)?;
                let parent = if at == 0 { "" } else { first_segment(rest) };
                Some(Capture::Id(parent))
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Target {
    Fixed(Operation),
    WithId(fn(i64) -> Operation),
}

struct Rule {
    root: &'static str,
    resource: Resource,
    shape: Shape,
    /// When set, the rule is only considered for this verb
    only: Option<Verb>,
    targets: &'static [(Verb, Target)],
}

const ROUTES: &[Rule] = &[
    Rule {
        root: "/questions",
        resource: Resource::Question,
        shape: Shape::Nested("answers"),
        only: Some(Verb::Post),
        targets: &[(Verb::Post, Target::WithId(Operation::CreateAnswer))],
    },
    Rule {
        root: "/questions",
        resource: Resource::Question,
        shape: Shape::Collection,
        only: None,
        targets: &[
            (Verb::Get, Target::Fixed(Operation::ListQuestions)),
            (Verb::Post, Target::Fixed(Operation::CreateQuestion)),
        ],
    },
    Rule {
        root: "/questions",
        resource: Resource::Question,
        shape: Shape::Member,
        only: None,
        targets: &[
            (Verb::Get, Target::WithId(Operation::GetQuestion)),
            (Verb::Delete, Target::WithId(Operation::DeleteQuestion)),
        ],
    },
    Rule {
        root: "/answers",
        resource: Resource::Answer,
        shape: Shape::Member,
        only: None,
        targets: &[
            (Verb::Get, Target::WithId(Operation::GetAnswer)),
            (Verb::Delete, Target::WithId(Operation::DeleteAnswer)),
        ],
    },
];

/// Resolve a request line against the route table.
pub fn resolve(method: &Method, path: &str) -> Result<Operation, RouteError> {
    let verb = Verb::from(method);

    for rule in ROUTES {
        if matches!(rule.only, Some(only) if only != verb) {
            continue;
        }
        let Some(rest) = strip_root(path, rule.root) else {
            continue;
        };
        let Some(capture) = rule.shape.capture(rest) else {
            continue;
        };

        let id = match capture {
            Capture::Bare => None,
            Capture::Id(segment) => Some(
                parse_id(segment).ok_or(RouteError::InvalidIdentifier(rule.resource))?,
            ),
        };

        let target = rule
            .targets
            .iter()
            .find(|(candidate, _)| *candidate == verb)
            .map(|(_, target)| *target)
            .ok_or(RouteError::MethodNotAllowed)?;

        return match (target, id) {
            (Target::Fixed(operation), _) => Ok(operation),
            (Target::WithId(make), Some(id)) => Ok(make(id)),
            (Target::WithId(_), None) => Err(RouteError::NoRoute),
        };
    }

    Err(RouteError::NoRoute)
}

/// Remainder below `root` with surrounding slashes trimmed, if `path` is
/// `root` itself or lies under it.
fn strip_root<'a>(path: &'a str, root: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest.trim_matches('/'))
    } else {
        None
    }
}

fn first_segment(rest: &str) -> &str {
    rest.split('/').next().unwrap_or_default()
}

fn parse_id(segment: &str) -> Option<i64> {
    if segment.is_empty() {
        return None;
    }
    segment.parse().ok()
}
