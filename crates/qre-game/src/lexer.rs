use super::GameError;

/// Lexical unit of the `.nfg` and `.efg` formats.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare identifier such as `NFG`, `R`, or a node kind.
    Word(String),
    /// Double-quoted string with `\"` escapes resolved.
    Text(String),
    /// Integer, decimal, exponent, or rational `a/b` literal.
    Number(f64),
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(w) => write!(f, "{}", w),
            Self::Text(t) => write!(f, "\"{}\"", t),
            Self::Number(x) => write!(f, "{}", x),
            Self::Open => write!(f, "{{"),
            Self::Close => write!(f, "}}"),
        }
    }
}

/// Split game text into tokens tagged with their line number.
/// Commas are separators and never produce tokens.
pub fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, GameError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;
    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() || c == ',' => {
                chars.next();
            }
            '{' => {
                chars.next();
                tokens.push((Token::Open, line));
            }
            '}' => {
                chars.next();
                tokens.push((Token::Close, line));
            }
            '"' => {
                chars.next();
                let start = line;
                let mut text = String::new();
                loop {
                    match chars.next() {
                        None => return Err(GameError::syntax(start, "unterminated string")),
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => return Err(GameError::syntax(start, "unterminated string")),
                        },
                        Some('\n') => {
                            line += 1;
                            text.push('\n');
                        }
                        Some(other) => text.push(other),
                    }
                }
                tokens.push((Token::Text(text), start));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, ',' | '{' | '}' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                let token = match word.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.')) {
                    true => Token::Number(number(&word).ok_or_else(|| {
                        GameError::syntax(line, format!("malformed number {}", word))
                    })?),
                    false => Token::Word(word),
                };
                tokens.push((token, line));
            }
        }
    }
    Ok(tokens)
}

/// Decimal, exponent, or rational literal.
fn number(word: &str) -> Option<f64> {
    match word.split_once('/') {
        Some((num, den)) => {
            let num = num.parse::<f64>().ok()?;
            let den = den.parse::<f64>().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => word.parse::<f64>().ok().filter(|x| x.is_finite()),
    }
}

/// Forward-only reader over a token list.
#[derive(Debug)]
pub struct Cursor {
    tokens: Vec<(Token, usize)>,
    index: usize,
}

impl Cursor {
    pub fn new(text: &str) -> Result<Self, GameError> {
        Ok(Self {
            tokens: tokenize(text)?,
            index: 0,
        })
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(t, _)| t)
    }
    /// Line of the next token, or of the last one at end of input.
    pub fn line(&self) -> usize {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map(|(_, l)| *l)
            .unwrap_or(1)
    }
    pub fn is_done(&self) -> bool {
        self.index >= self.tokens.len()
    }

    pub fn next(&mut self) -> Result<Token, GameError> {
        let (token, _) = self.tokens.get(self.index).cloned().ok_or(GameError::Truncated)?;
        self.index += 1;
        Ok(token)
    }

    fn unexpected(&self, found: &Token, wanted: &str) -> GameError {
        GameError::syntax(self.line(), format!("expected {}, found {}", wanted, found))
    }

    pub fn open(&mut self) -> Result<(), GameError> {
        match self.next()? {
            Token::Open => Ok(()),
            other => Err(self.unexpected(&other, "'{'")),
        }
    }
    pub fn close(&mut self) -> Result<(), GameError> {
        match self.next()? {
            Token::Close => Ok(()),
            other => Err(self.unexpected(&other, "'}'")),
        }
    }
    pub fn text(&mut self) -> Result<String, GameError> {
        match self.next()? {
            Token::Text(t) => Ok(t),
            other => Err(self.unexpected(&other, "a quoted string")),
        }
    }
    pub fn word(&mut self) -> Result<String, GameError> {
        match self.next()? {
            Token::Word(w) => Ok(w),
            other => Err(self.unexpected(&other, "a keyword")),
        }
    }
    pub fn number(&mut self) -> Result<f64, GameError> {
        match self.next()? {
            Token::Number(x) => Ok(x),
            other => Err(self.unexpected(&other, "a number")),
        }
    }
    pub fn integer(&mut self) -> Result<usize, GameError> {
        match self.next()? {
            Token::Number(x) if x >= 0.0 && x.fract() == 0.0 => Ok(x as usize),
            other => Err(self.unexpected(&other, "a non-negative integer")),
        }
    }

    /// Consume a quoted string if one comes next.
    pub fn maybe_text(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Text(_)) => self.text().ok(),
            _ => None,
        }
    }
    pub fn at_open(&self) -> bool {
        matches!(self.peek(), Some(Token::Open))
    }
    pub fn at_close(&self) -> bool {
        matches!(self.peek(), Some(Token::Close))
    }

    /// `{ "a" "b" … }`
    pub fn texts(&mut self) -> Result<Vec<String>, GameError> {
        self.open()?;
        let mut texts = Vec::new();
        while !self.at_close() {
            texts.push(self.text()?);
        }
        self.close()?;
        Ok(texts)
    }
    /// `{ 1 2/3 -4.5 … }`
    pub fn numbers(&mut self) -> Result<Vec<f64>, GameError> {
        self.open()?;
        let mut numbers = Vec::new();
        while !self.at_close() {
            numbers.push(self.number()?);
        }
        self.close()?;
        Ok(numbers)
    }
}
