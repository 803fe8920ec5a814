//! Redis-style glob patterns for backends without native pattern support

/// Compiled glob pattern supporting `*`, `?`, `[...]` and `\` escapes
///
/// Every pattern is accepted and matched the way Redis `KEYS`/`SCAN MATCH`
/// match it: an unclosed `[` runs to the end of the pattern, a trailing `\`
/// is a literal backslash, and `\` inside a class escapes the next character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    AnySequence,
    AnyChar,
    Literal(char),
    Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

impl Token {
    fn matches(&self, c: char) -> bool {
        match self {
            Token::AnySequence | Token::AnyChar => true,
            Token::Literal(expected) => *expected == c,
            Token::Class { negated, items } => {
                let hit = items.iter().any(|item| match *item {
                    ClassItem::Char(expected) => expected == c,
                    ClassItem::Range(start, end) => (start..=end).contains(&c),
                });
                hit != *negated
            }
        }
    }
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '*' => {
                    if tokens.last() != Some(&Token::AnySequence) {
                        tokens.push(Token::AnySequence);
                    }
                    i += 1;
                }
                '?' => {
                    tokens.push(Token::AnyChar);
                    i += 1;
                }
                '\\' if i + 1 < chars.len() => {
                    tokens.push(Token::Literal(chars[i + 1]));
                    i += 2;
                }
                '[' => {
                    let (token, next) = parse_class(&chars, i + 1);
                    tokens.push(token);
                    i = next;
                }
                other => {
                    tokens.push(Token::Literal(other));
                    i += 1;
                }
            }
        }

        Self { tokens }
    }

    pub fn matches(&self, key: &str) -> bool {
        let key: Vec<char> = key.chars().collect();
        match_tokens(&self.tokens, &key)
    }
}

/// Parses a class body starting right after `[`, returning the index after it
fn parse_class(chars: &[char], mut i: usize) -> (Token, usize) {
    let negated = chars.get(i) == Some(&'^');
    if negated {
        i += 1;
    }

    let mut items = Vec::new();
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                items.push(ClassItem::Char(chars[i + 1]));
                i += 2;
            }
            ']' => {
                i += 1;
                break;
            }
            start if i + 2 < chars.len() && chars[i + 1] == '-' => {
                let end = chars[i + 2];
                items.push(ClassItem::Range(start.min(end), start.max(end)));
                i += 3;
            }
            c => {
                items.push(ClassItem::Char(c));
                i += 1;
            }
        }
    }

    (Token::Class { negated, items }, i)
}

fn match_tokens(tokens: &[Token], key: &[char]) -> bool {
    match tokens.split_first() {
        None => key.is_empty(),
        Some((Token::AnySequence, [])) => true,
        Some((Token::AnySequence, rest)) => {
            (0..=key.len()).any(|skip| match_tokens(rest, &key[skip..]))
        }
        Some((token, rest)) => match key.split_first() {
            Some((c, tail)) => token.matches(*c) && match_tokens(rest, tail),
            None => false,
        },
    }
}
