use super::CompileError;
use std::fmt::Display;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// a bare name: a function, an index keyword or a variable
    Identifier(String),
    /// an `@`-prefixed variable reference
    Variable(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Question,
    Colon,
    Comma,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    End,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {n}"),
            TokenKind::Identifier(name) => write!(f, "'{name}'"),
            TokenKind::Variable(name) => write!(f, "'@{name}'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::EqualEqual => write!(f, "'=='"),
            TokenKind::BangEqual => write!(f, "'!='"),
            TokenKind::Less => write!(f, "'<'"),
            TokenKind::LessEqual => write!(f, "'<='"),
            TokenKind::Greater => write!(f, "'>'"),
            TokenKind::GreaterEqual => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::LeftBracket => write!(f, "'['"),
            TokenKind::RightBracket => write!(f, "']'"),
            TokenKind::End => write!(f, "end of expression"),
        }
    }
}

/// a token and the character position where it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Token {
        Token { kind, position }
    }
}

/// splits expression text into tokens. the result always ends with a
/// [`TokenKind::End`] token positioned one past the last character.
pub fn tokenize(text: &str) -> Result<Vec<Token>, CompileError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        let start = i;
        let (kind, width) = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            c if c.is_ascii_digit() || (c == '.' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let (value, width) = scan_number(&chars, start)?;
                (TokenKind::Number(value), width)
            }
            c if is_identifier_start(c) => {
                let name = scan_identifier(&chars, start);
                let width = name.chars().count();
                (TokenKind::Identifier(name), width)
            }
            '@' => match next {
                Some(n) if is_identifier_start(n) => {
                    let name = scan_identifier(&chars, start + 1);
                    let width = name.chars().count() + 1;
                    (TokenKind::Variable(name), width)
                }
                _ => {
                    return Err(CompileError::syntax(
                        start,
                        "expected a variable name after '@'",
                    ))
                }
            },
            '+' => (TokenKind::Plus, 1),
            '-' => (TokenKind::Minus, 1),
            '*' => (TokenKind::Star, 1),
            '/' => (TokenKind::Slash, 1),
            '^' => (TokenKind::Caret, 1),
            '?' => (TokenKind::Question, 1),
            ':' => (TokenKind::Colon, 1),
            ',' => (TokenKind::Comma, 1),
            '(' => (TokenKind::LeftParen, 1),
            ')' => (TokenKind::RightParen, 1),
            '[' => (TokenKind::LeftBracket, 1),
            ']' => (TokenKind::RightBracket, 1),
            '!' if next == Some('=') => (TokenKind::BangEqual, 2),
            '!' => (TokenKind::Bang, 1),
            '<' if next == Some('=') => (TokenKind::LessEqual, 2),
            '<' => (TokenKind::Less, 1),
            '>' if next == Some('=') => (TokenKind::GreaterEqual, 2),
            '>' => (TokenKind::Greater, 1),
            '=' if next == Some('=') => (TokenKind::EqualEqual, 2),
            '=' => return Err(CompileError::syntax(start, "unexpected '=', expected '=='")),
            '&' if next == Some('&') => (TokenKind::AndAnd, 2),
            '&' => return Err(CompileError::syntax(start, "unexpected '&', expected '&&'")),
            '|' if next == Some('|') => (TokenKind::OrOr, 2),
            '|' => return Err(CompileError::syntax(start, "unexpected '|', expected '||'")),
            other => {
                return Err(CompileError::syntax(
                    start,
                    format!("unexpected character '{other}'"),
                ))
            }
        };
        tokens.push(Token::new(kind, start));
        i += width;
    }
    tokens.push(Token::new(TokenKind::End, chars.len()));
    Ok(tokens)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn scan_identifier(chars: &[char], start: usize) -> String {
    chars[start..]
        .iter()
        .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
        .collect()
}

/// scans `digits [. digits] [(e|E) [+|-] digits]`, returning the value and
/// the number of characters consumed.
fn scan_number(chars: &[char], start: usize) -> Result<(f64, usize), CompileError> {
    let digits_from = |from: usize| {
        chars[from..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count()
    };
    let mut end = start + digits_from(start);
    if chars.get(end) == Some(&'.') {
        end += 1;
        end += digits_from(end);
    }
    if matches!(chars.get(end), Some('e') | Some('E')) {
        let mut exponent = end + 1;
        if matches!(chars.get(exponent), Some('+') | Some('-')) {
            exponent += 1;
        }
        let exponent_digits = digits_from(exponent);
        if exponent_digits > 0 {
            end = exponent + exponent_digits;
        }
    }
    let text: String = chars[start..end].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|e| CompileError::syntax(start, format!("invalid number '{text}': {e}")))?;
    Ok((value, end - start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text)
            .expect("test invariant failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 0.5 .25 1e-3 2.5E2"),
            vec![
                TokenKind::Number(1.0),
                TokenKind::Number(0.5),
                TokenKind::Number(0.25),
                TokenKind::Number(0.001),
                TokenKind::Number(250.0),
                TokenKind::End
            ]
        );
    }

    #[test]
    fn test_variables_and_operators() {
        assert_eq!(
            kinds("@ivt*-0.05 >= x_1 && !@b"),
            vec![
                TokenKind::Variable("ivt".into()),
                TokenKind::Star,
                TokenKind::Minus,
                TokenKind::Number(0.05),
                TokenKind::GreaterEqual,
                TokenKind::Identifier("x_1".into()),
                TokenKind::AndAnd,
                TokenKind::Bang,
                TokenKind::Variable("b".into()),
                TokenKind::End
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("  @sov[orig, dest]").expect("test invariant failed");
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![2, 6, 7, 11, 13, 17, 18]);
    }

    #[test]
    fn test_single_equals_is_error() {
        let result = tokenize("@mode = 1");
        assert_eq!(
            result,
            Err(CompileError::syntax(6, "unexpected '=', expected '=='"))
        );
    }

    #[test]
    fn test_unexpected_character() {
        match tokenize("1 + #") {
            Err(CompileError::SyntaxError { position, .. }) => assert_eq!(position, 4),
            other => panic!("expected syntax error, found {other:?}"),
        }
    }

    #[test]
    fn test_dangling_sigil() {
        match tokenize("@ + 1") {
            Err(CompileError::SyntaxError { position, .. }) => assert_eq!(position, 0),
            other => panic!("expected syntax error, found {other:?}"),
        }
    }
}
