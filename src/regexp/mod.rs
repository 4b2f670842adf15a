//! Pattern compilation: lex, convert to postfix, replay onto an NFA
//! builder, determinize.

mod parser;

use thiserror::Error;

use crate::automaton::{determinize, Dfa, Fragment, Nfa, NfaBuilder};
use parser::{Op, Piece, Token};

/// Everything that can go wrong while compiling a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `[` with no matching `]` before the end of the pattern.
    #[error("unterminated character class")]
    UnterminatedCharacterClass,
    /// A `(` or `)` without its partner.
    #[error("mismatched parentheses")]
    MismatchedParentheses,
    /// The pattern does not reduce to exactly one expression, e.g. an
    /// operator with a missing operand or an empty pattern.
    #[error("malformed expression")]
    MalformedExpression,
}

/// Compile a pattern all the way to a scannable DFA.
pub(crate) fn compile(pattern: &[u8]) -> Result<Dfa, ParseError> {
    Ok(determinize(build_nfa(pattern)?))
}

/// Compile a pattern to its epsilon-NFA, stopping before determinization.
pub(crate) fn build_nfa(pattern: &[u8]) -> Result<Nfa, ParseError> {
    let tokens = parser::resolve(pattern)?;
    let rpn = parser::to_rpn(tokens)?;
    replay(rpn)
}

/// Replay an RPN program onto a fragment stack.
///
/// Pieces push fragments; operators pop their operand(s) and push the
/// composite. A well-formed program leaves exactly one fragment. On any
/// failure every live fragment is discarded before returning, so a failed
/// compile leaves no states behind.
fn replay(rpn: Vec<Token>) -> Result<Nfa, ParseError> {
    let mut builder = NfaBuilder::new();
    let mut stack: Vec<Fragment> = Vec::new();
    let mut underflow = false;

    for token in rpn {
        match token {
            Token::Piece(piece) => {
                let frag = match piece {
                    Piece::Literal(byte) => builder.literal(byte),
                    Piece::Class(bytes) => builder.class(&bytes),
                    Piece::AnyByte { include_empty } => builder.any_byte(include_empty),
                };
                stack.push(frag);
            }
            Token::Op(op) => {
                let frag = match op {
                    Op::Concat | Op::Union => {
                        let Some(right) = stack.pop() else {
                            underflow = true;
                            break;
                        };
                        let Some(left) = stack.pop() else {
                            builder.discard(right);
                            underflow = true;
                            break;
                        };
                        if op == Op::Concat {
                            builder.concat(left, right)
                        } else {
                            builder.union(left, right)
                        }
                    }
                    Op::Star | Op::Plus => {
                        let Some(operand) = stack.pop() else {
                            underflow = true;
                            break;
                        };
                        if op == Op::Star {
                            builder.star(operand)
                        } else {
                            builder.plus(operand)
                        }
                    }
                    // to_rpn consumes every parenthesis or errors out.
                    Op::LParen | Op::RParen => unreachable!("parenthesis in RPN"),
                };
                stack.push(frag);
            }
        }
    }

    if !underflow && stack.len() == 1 {
        if let Some(frag) = stack.pop() {
            return Ok(builder.finish(frag));
        }
    }

    for frag in stack.drain(..) {
        builder.discard(frag);
    }
    debug_assert_eq!(builder.live_count(), 0, "failed compile leaked states");
    Err(ParseError::MalformedExpression)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dfa(pattern: &str) -> Dfa {
        compile(pattern.as_bytes()).unwrap()
    }

    #[test]
    fn test_literal_sequence() {
        let dfa = dfa("abc");
        assert!(dfa.accepts(b"abc"));
        assert!(!dfa.accepts(b"ab"));
        assert!(!dfa.accepts(b"abcd"));
    }

    #[test]
    fn test_union_groups() {
        let dfa = dfa("a(b|c)d");
        assert!(dfa.accepts(b"abd"));
        assert!(dfa.accepts(b"acd"));
        assert!(!dfa.accepts(b"ad"));
        assert!(!dfa.accepts(b"abcd"));
    }

    #[test]
    fn test_star_and_plus() {
        let star = dfa("ab*");
        assert!(star.accepts(b"a"));
        assert!(star.accepts(b"abbb"));
        assert!(!star.accepts(b"b"));

        let plus = dfa("ab+");
        assert!(!plus.accepts(b"a"));
        assert!(plus.accepts(b"ab"));
        assert!(plus.accepts(b"abbb"));
    }

    #[test]
    fn test_any_byte_operators() {
        let dot = dfa(".");
        assert!(dot.accepts(b"a"));
        assert!(dot.accepts(b"\x00"));
        assert!(dot.accepts(b"\xFF"));
        assert!(!dot.accepts(b""));
        assert!(!dot.accepts(b"ab"));

        let opt = dfa("a?");
        assert!(opt.accepts(b"a"));
        assert!(opt.accepts(b"ab"));
        assert!(opt.accepts(b"a\x00"));
        assert!(!opt.accepts(b""));
        assert!(!opt.accepts(b"abc"));
    }

    #[test]
    fn test_escaped_metacharacters() {
        let dfa = dfa("a\\.b");
        assert!(dfa.accepts(b"a.b"));
        assert!(!dfa.accepts(b"axb"));

        let newline = super::compile(b"\\n").unwrap();
        assert!(newline.accepts(b"\n"));
        assert!(!newline.accepts(b"n"));
    }

    #[test]
    fn test_trailing_backslash_is_literal() {
        let dfa = super::compile(b"a\\").unwrap();
        assert!(dfa.accepts(b"a\\"));
        assert!(!dfa.accepts(b"a"));
    }

    #[test]
    fn test_nul_byte_is_matchable() {
        let dfa = super::compile(b"a\x00b").unwrap();
        assert!(dfa.accepts(b"a\x00b"));
        assert!(!dfa.accepts(b"ab"));
    }

    #[test]
    fn test_empty_class_accepts_nothing() {
        let dfa = dfa("[]");
        for b in 0..=u8::MAX {
            assert!(!dfa.accepts(&[b]));
        }
        assert!(!dfa.accepts(b""));
    }

    #[test]
    fn test_error_variants() {
        assert_eq!(
            compile(b"(a|b").unwrap_err(),
            ParseError::MismatchedParentheses
        );
        assert_eq!(
            compile(b"a)b").unwrap_err(),
            ParseError::MismatchedParentheses
        );
        assert_eq!(
            compile(b"[ab").unwrap_err(),
            ParseError::UnterminatedCharacterClass
        );
        assert_eq!(compile(b"").unwrap_err(), ParseError::MalformedExpression);
        assert_eq!(compile(b"*").unwrap_err(), ParseError::MalformedExpression);
        assert_eq!(compile(b"a|").unwrap_err(), ParseError::MalformedExpression);
        assert_eq!(compile(b"|a").unwrap_err(), ParseError::MalformedExpression);
    }

    #[test]
    fn test_failed_compile_discards_all_fragments() {
        // replay asserts zero live states on its error path; these drive
        // the underflow branches with fragments already on the stack.
        assert!(compile(b"ab|").is_err());
        assert!(compile(b"a(bc|)d").is_err());
    }

    #[test]
    fn test_deep_nesting_compiles() {
        let mut pattern = String::new();
        for _ in 0..200 {
            pattern.push('(');
        }
        pattern.push('a');
        for _ in 0..200 {
            pattern.push(')');
        }
        pattern.push('*');
        let dfa = compile(pattern.as_bytes()).unwrap();
        assert!(dfa.accepts(b""));
        assert!(dfa.accepts(b"aaa"));
    }
}
