//! Lexing and operator-precedence conversion for the pattern language.
//!
//! [`resolve`] turns raw pattern bytes into a token stream, handling
//! escapes and bracket expressions and inserting the implicit concatenation
//! operator wherever one fragment directly follows another. [`to_rpn`] then
//! rewrites the stream into postfix order with the classic shunting-yard
//! algorithm, discarding parentheses.

use super::ParseError;

/// A fragment descriptor: something the NFA builder can turn into a
/// two-state sub-graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
    /// One literal byte.
    Literal(u8),
    /// One byte drawn from an explicit set (bracket expression).
    Class(Vec<u8>),
    /// Any one byte (`.`), optionally also the empty string (`?`).
    AnyByte { include_empty: bool },
}

/// Pattern operators, including the implicit concatenation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    LParen,
    RParen,
    Union,
    Concat,
    Star,
    Plus,
}

impl Op {
    /// `(` is a low sentinel so nothing pops past it; `*` and `+` bind
    /// tightest and are right-associative.
    fn precedence(self) -> u8 {
        match self {
            Op::LParen => 0,
            Op::Union => 1,
            Op::Concat => 2,
            Op::Star | Op::Plus => 3,
            Op::RParen => 4,
        }
    }

    fn right_associative(self) -> bool {
        matches!(self, Op::Star | Op::Plus)
    }

    /// Operators a fragment may directly follow, requiring an implicit
    /// concatenation before that fragment.
    fn glues(self) -> bool {
        matches!(self, Op::RParen | Op::Star | Op::Plus)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Piece(Piece),
    Op(Op),
}

/// Lex a raw pattern into tokens with implicit concatenation inserted.
pub(crate) fn resolve(pattern: &[u8]) -> Result<Vec<Token>, ParseError> {
    let mut tokens: Vec<Token> = Vec::new();
    // True after any token a fragment can directly follow: a fragment
    // itself, or `)`, `*`, `+`.
    let mut glue = false;
    let mut i = 0;

    while i < pattern.len() {
        match pattern[i] {
            b'\\' => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                i += 1;
                let literal = match pattern.get(i) {
                    Some(b't') => 0x09,
                    Some(b'n') => 0x0A,
                    Some(b'r') => 0x0D,
                    // Unrecognized escapes pass the byte through literally.
                    Some(&other) => other,
                    // A trailing backslash escapes nothing; keep it literal.
                    None => b'\\',
                };
                i += 1;
                tokens.push(Token::Piece(Piece::Literal(literal)));
                glue = true;
            }
            b'(' => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                tokens.push(Token::Op(Op::LParen));
                glue = false;
                i += 1;
            }
            b')' => {
                tokens.push(Token::Op(Op::RParen));
                glue = Op::RParen.glues();
                i += 1;
            }
            b'|' => {
                tokens.push(Token::Op(Op::Union));
                glue = false;
                i += 1;
            }
            b'*' => {
                tokens.push(Token::Op(Op::Star));
                glue = Op::Star.glues();
                i += 1;
            }
            b'+' => {
                tokens.push(Token::Op(Op::Plus));
                glue = Op::Plus.glues();
                i += 1;
            }
            b'[' => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                let (piece, next) = bracket_expression(pattern, i)?;
                tokens.push(Token::Piece(piece));
                glue = true;
                i = next;
            }
            b'.' => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                tokens.push(Token::Piece(Piece::AnyByte {
                    include_empty: false,
                }));
                glue = true;
                i += 1;
            }
            b'?' => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                tokens.push(Token::Piece(Piece::AnyByte {
                    include_empty: true,
                }));
                glue = true;
                i += 1;
            }
            other => {
                if glue {
                    tokens.push(Token::Op(Op::Concat));
                }
                tokens.push(Token::Piece(Piece::Literal(other)));
                glue = true;
                i += 1;
            }
        }
    }

    // A trailing concatenation marker has nothing to glue.
    if tokens.last() == Some(&Token::Op(Op::Concat)) {
        tokens.pop();
    }

    Ok(tokens)
}

/// Parse `[...]` / `[^...]` starting at the `[` at `open`. Returns the
/// class piece and the index just past the closing `]`.
///
/// The first and last characters inside the brackets are always literal
/// members. A `-` between two interior characters denotes an inclusive
/// ascending range; a `-` that cannot form an ascending range stays
/// literal. No escape processing happens inside brackets.
fn bracket_expression(pattern: &[u8], open: usize) -> Result<(Piece, usize), ParseError> {
    let mut body_start = open + 1;
    let inverted = pattern.get(body_start) == Some(&b'^');
    if inverted {
        body_start += 1;
    }

    let close = pattern[body_start..]
        .iter()
        .position(|&b| b == b']')
        .map(|offset| body_start + offset)
        .ok_or(ParseError::UnterminatedCharacterClass)?;
    let body = &pattern[body_start..close];

    let mut member = [false; 256];
    if let (Some(&first), Some(&last)) = (body.first(), body.last()) {
        member[first as usize] = true;
        member[last as usize] = true;
    }
    for k in 1..body.len().saturating_sub(1) {
        if body[k] == b'-' {
            let (lo, hi) = (body[k - 1], body[k + 1]);
            if lo <= hi {
                for b in lo..=hi {
                    member[b as usize] = true;
                }
            } else {
                member[b'-' as usize] = true;
            }
        } else {
            member[body[k] as usize] = true;
        }
    }

    let bytes: Vec<u8> = (0..=u8::MAX)
        .filter(|&b| member[b as usize] != inverted)
        .collect();
    Ok((Piece::Class(bytes), close + 1))
}

/// Shunting-yard conversion of the token stream into postfix (RPN) order.
///
/// Pops operators of strictly higher precedence, or equal precedence when
/// the incoming operator is left-associative. `)` pops to its matching `(`
/// and discards both; an unmatched parenthesis on either side is a
/// [`ParseError::MismatchedParentheses`].
pub(crate) fn to_rpn(tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Op> = Vec::new();

    for token in tokens {
        match token {
            Token::Piece(_) => output.push(token),
            Token::Op(Op::RParen) => loop {
                match stack.pop() {
                    Some(Op::LParen) => break,
                    Some(op) => output.push(Token::Op(op)),
                    None => return Err(ParseError::MismatchedParentheses),
                }
            },
            Token::Op(op) => {
                if op != Op::LParen {
                    while let Some(&top) = stack.last() {
                        let pops = top != Op::LParen
                            && (op.precedence() < top.precedence()
                                || (op.precedence() == top.precedence()
                                    && !op.right_associative()));
                        if !pops {
                            break;
                        }
                        output.push(Token::Op(top));
                        stack.pop();
                    }
                }
                stack.push(op);
            }
        }
    }

    while let Some(op) = stack.pop() {
        if op == Op::LParen {
            return Err(ParseError::MismatchedParentheses);
        }
        output.push(Token::Op(op));
    }

    Ok(output)
}
