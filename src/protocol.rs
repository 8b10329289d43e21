//! Wire protocol: one text line per message.
//!
//! Requests read `id:<n> <COMMAND> <key> [<value>]`; responses echo the id
//! token followed by the result text. The id token is opaque to the server,
//! which echoes it verbatim even for malformed lines; only the client
//! interprets it when matching replies to pending requests.

use crate::{KvError, Result};

/// Result text acknowledging a successful PUT.
pub const OK: &str = "Ok.";

/// Result text for GET or DELETE on an absent key.
pub const KEY_NOT_FOUND: &str = "Key does not exist";

const USAGE_ALL: &str = "Invalid request format. Usage: PUT key value | GET key | DELETE key";
const USAGE_PUT: &str = "Invalid request format. Usage: PUT key value";
const USAGE_GET: &str = "Invalid request format. Usage: GET key";
const USAGE_DELETE: &str = "Invalid request format. Usage: DELETE key";
const USAGE_UNKNOWN: &str = "Invalid command. Usage: PUT key value | GET key | DELETE key";

/// A validated store command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a key to a value, overwriting any previous one.
    Put {
        /// The key to set.
        key: String,
        /// The value to associate with the key.
        value: String,
    },
    /// Look up the value of a key.
    Get {
        /// The key to look up.
        key: String,
    },
    /// Remove a key.
    Delete {
        /// The key to remove.
        key: String,
    },
}

impl Command {
    /// Parses the command portion of a request line, the id token already
    /// stripped.
    ///
    /// Tokens are separated by single spaces and may not be empty, so a
    /// doubled or trailing space is malformed. The command word itself is
    /// matched case-insensitively. Failures carry the usage text that goes
    /// back to the client.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens: Vec<&str> = text.split(' ').collect();
        if tokens.len() < 2 || tokens.iter().any(|t| t.is_empty()) {
            return Err(KvError::Protocol(USAGE_ALL.to_owned()));
        }
        match tokens[0].to_ascii_uppercase().as_str() {
            "PUT" => {
                if tokens.len() == 3 {
                    Ok(Command::Put {
                        key: tokens[1].to_owned(),
                        value: tokens[2].to_owned(),
                    })
                } else {
                    Err(KvError::Protocol(USAGE_PUT.to_owned()))
                }
            }
            "GET" => {
                if tokens.len() == 2 {
                    Ok(Command::Get {
                        key: tokens[1].to_owned(),
                    })
                } else {
                    Err(KvError::Protocol(USAGE_GET.to_owned()))
                }
            }
            "DELETE" => {
                if tokens.len() == 2 {
                    Ok(Command::Delete {
                        key: tokens[1].to_owned(),
                    })
                } else {
                    Err(KvError::Protocol(USAGE_DELETE.to_owned()))
                }
            }
            _ => Err(KvError::Protocol(USAGE_UNKNOWN.to_owned())),
        }
    }
}

/// Splits a request line into its leading id token and the command text.
///
/// The id token is separated before any validation so the response can echo
/// it even when the rest of the line is malformed.
pub fn split_id(line: &str) -> (&str, &str) {
    line.split_once(' ').unwrap_or((line, ""))
}

/// Builds a request line: `id:<n> <text>`.
pub fn encode_request(id: u64, text: &str) -> String {
    format!("id:{id} {text}")
}

/// Builds a response line: the echoed id token followed by the result text.
pub fn encode_response(id: &str, result: &str) -> String {
    format!("{id} {result}")
}

/// Extracts the result text from a response line whose id token matches the
/// request id just sent.
///
/// `None` means the response is unsolicited: it answers some other request,
/// or carries no id at all, and must not be shown as the pending answer.
pub fn match_response(line: &str, id: u64) -> Option<&str> {
    let (token, result) = line.split_once(' ')?;
    if token == format!("id:{id}") {
        Some(result)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_of(text: &str) -> String {
        match Command::parse(text) {
            Err(KvError::Protocol(msg)) => msg,
            other => panic!("expected protocol error for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn parses_put_with_exact_arity() {
        assert_eq!(
            Command::parse("PUT apple red").unwrap(),
            Command::Put {
                key: "apple".to_owned(),
                value: "red".to_owned(),
            }
        );
    }

    #[test]
    fn parses_get_and_delete() {
        assert_eq!(
            Command::parse("GET apple").unwrap(),
            Command::Get {
                key: "apple".to_owned(),
            }
        );
        assert_eq!(
            Command::parse("DELETE apple").unwrap(),
            Command::Delete {
                key: "apple".to_owned(),
            }
        );
    }

    #[test]
    fn command_word_is_case_insensitive() {
        assert_eq!(
            Command::parse("geT kiwi").unwrap(),
            Command::Get {
                key: "kiwi".to_owned(),
            }
        );
        assert_eq!(
            Command::parse("put kiwi green").unwrap(),
            Command::Put {
                key: "kiwi".to_owned(),
                value: "green".to_owned(),
            }
        );
    }

    #[test]
    fn wrong_arity_names_the_command_usage() {
        assert_eq!(usage_of("PUT watermelon green red"), USAGE_PUT);
        assert_eq!(usage_of("get kiwi green"), USAGE_GET);
        assert_eq!(usage_of("DELETE a b"), USAGE_DELETE);
    }

    #[test]
    fn lone_token_gets_generic_usage() {
        assert_eq!(usage_of("put"), USAGE_ALL);
        assert_eq!(usage_of("xxx"), USAGE_ALL);
        assert_eq!(usage_of(""), USAGE_ALL);
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(usage_of("push a b"), USAGE_UNKNOWN);
    }

    #[test]
    fn empty_tokens_are_malformed() {
        assert_eq!(usage_of("GET  apple"), USAGE_ALL);
        assert_eq!(usage_of("GET apple "), USAGE_ALL);
    }

    #[test]
    fn split_id_separates_the_leading_token() {
        assert_eq!(split_id("id:4 GET apple"), ("id:4", "GET apple"));
        assert_eq!(split_id("id:4"), ("id:4", ""));
        assert_eq!(split_id(""), ("", ""));
    }

    #[test]
    fn encodes_requests_and_responses() {
        assert_eq!(encode_request(3, "GET apple"), "id:3 GET apple");
        assert_eq!(encode_response("id:3", "red"), "id:3 red");
    }

    #[test]
    fn matches_responses_by_id() {
        assert_eq!(match_response("id:3 red", 3), Some("red"));
        assert_eq!(match_response("id:4 red", 3), None);
        assert_eq!(match_response("red", 3), None);
        assert_eq!(match_response("id:3", 3), None);
    }
}
