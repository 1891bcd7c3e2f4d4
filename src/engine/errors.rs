use thiserror::Error;

/// Errors returned synchronously from a single engine call.
///
/// The codes are stable strings because they are relayed verbatim across the
/// host and any wire layer sitting in front of it. A call that returns one of
/// these has not mutated any game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    /// The game has no turn yet.
    #[error("NOTSTARTED: {0}")]
    NotStarted(String),

    /// `start` was called twice, or setup was attempted after starting.
    #[error("ALREADYSTARTED: {0}")]
    AlreadyStarted(String),

    /// Cannot start a game nobody has joined.
    #[error("NOPLAYERS: {0}")]
    NoPlayers(String),

    /// The command came from someone other than the turn owner.
    #[error("NOTYOURTURN: {0}")]
    NotYourTurn(String),

    /// Recognised command whose preconditions are not met right now.
    #[error("NOTNOW: {0}")]
    NotNow(String),

    /// `end` attempted while obligations are pending.
    #[error("MUSTDO: {0}")]
    MustDo(String),

    /// Command not valid in the current turn phase.
    #[error("WRONGPHASE: {0}")]
    WrongPhase(String),

    /// Malformed options, unknown command or bad denomination.
    #[error("BADREQUEST: {0}")]
    BadRequest(String),

    /// Duplicate player name or colour.
    #[error("CONFLICT: {0}")]
    Conflict(String),
}

impl PlayError {
    /// Stable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            PlayError::NotStarted(_) => "NOTSTARTED",
            PlayError::AlreadyStarted(_) => "ALREADYSTARTED",
            PlayError::NoPlayers(_) => "NOPLAYERS",
            PlayError::NotYourTurn(_) => "NOTYOURTURN",
            PlayError::NotNow(_) => "NOTNOW",
            PlayError::MustDo(_) => "MUSTDO",
            PlayError::WrongPhase(_) => "WRONGPHASE",
            PlayError::BadRequest(_) => "BADREQUEST",
            PlayError::Conflict(_) => "CONFLICT",
        }
    }

    /// Human readable detail, without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            PlayError::NotStarted(m)
            | PlayError::AlreadyStarted(m)
            | PlayError::NoPlayers(m)
            | PlayError::NotYourTurn(m)
            | PlayError::NotNow(m)
            | PlayError::MustDo(m)
            | PlayError::WrongPhase(m)
            | PlayError::BadRequest(m)
            | PlayError::Conflict(m) => m,
        }
    }

    pub fn not_started() -> Self {
        PlayError::NotStarted("game has not started".to_string())
    }

    pub fn not_your_turn() -> Self {
        PlayError::NotYourTurn("it's not your turn".to_string())
    }

    pub fn not_now(msg: impl Into<String>) -> Self {
        PlayError::NotNow(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        PlayError::BadRequest(msg.into())
    }
}

/// Problems in the static world data. These are fatal at construction time:
/// a game is never built from data that produces one of these.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid world json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad link {link} on dot {dot}")]
    DanglingLink { dot: String, link: String },

    #[error("dot {dot} refers to unknown place {place}")]
    UnknownPlace { dot: String, place: String },

    #[error("place {0} has no dot")]
    PlaceWithoutDot(String),

    #[error("place {place} uses unknown currency {currency}")]
    UnknownCurrency { place: String, currency: String },

    #[error("currency {0} has no denominations or a non-positive rate")]
    BadCurrency(String),

    #[error("home place {0} does not exist")]
    UnknownHome(String),

    #[error("malformed {kind} code {code:?}: {reason}")]
    MalformedCode {
        kind: &'static str,
        code: String,
        reason: String,
    },

    #[error("no square has type {0}")]
    UnknownSquareType(String),

    #[error("the track has no squares")]
    NoSquares,
}

/// Failure to restore a saved game document.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PlayError::not_now("x").code(), "NOTNOW");
        assert_eq!(PlayError::MustDo(String::new()).code(), "MUSTDO");
        assert_eq!(PlayError::Conflict("name".into()).code(), "CONFLICT");
    }

    #[test]
    fn display_has_code_prefix() {
        let e = PlayError::bad_request("bad command: fly");
        assert_eq!(e.to_string(), "BADREQUEST: bad command: fly");
        assert_eq!(e.message(), "bad command: fly");
    }
}
