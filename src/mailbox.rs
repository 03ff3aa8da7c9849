//! Single-mailbox parser for the RFC 5322 `mailbox` production.
//!
//! Accepts either a bare `addr-spec` (`local@domain`) or a `name-addr`
//! (`Display Name <local@domain>`). Comments and folding whitespace are
//! skipped, UTF-8 is allowed in atoms (RFC 6532). Group syntax and address
//! lists are rejected: exactly one mailbox must make up the input.

/// A parsed mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Mailbox {
    pub name: Option<String>,
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum MailboxError {
    #[error("empty address")]
    Empty,
    #[error("missing @ in addr-spec")]
    MissingAt,
    /// Unquoted whitespace splitting what should be the local part.
    #[error("whitespace in local part")]
    LocalPartWhitespace,
    #[error("invalid local part")]
    InvalidLocalPart,
    #[error("invalid domain")]
    InvalidDomain,
    #[error("unclosed quoted-string")]
    UnclosedQuote,
    #[error("unclosed comment")]
    UnclosedComment,
    #[error("unclosed angle-addr")]
    UnclosedAngle,
    #[error("no angle-addr")]
    NoAngleAddr,
    #[error("expected single address")]
    TrailingInput,
}

pub(crate) fn parse_mailbox(input: &str) -> Result<Mailbox, MailboxError> {
    if input.trim().is_empty() {
        return Err(MailboxError::Empty);
    }

    let mut bare = Parser::new(input);
    let spec_err = match bare.addr_spec() {
        Ok(address) => {
            bare.skip_cfws()?;
            if bare.at_end() {
                return Ok(Mailbox {
                    name: None,
                    address,
                });
            }
            MailboxError::TrailingInput
        }
        Err(err) => err,
    };

    // Only retry as `name-addr` when an angle bracket could make it one.
    if !input.contains('<') {
        return Err(spec_err);
    }

    let mut named = Parser::new(input);
    let name = named.phrase()?;
    named.skip_cfws()?;
    if !named.eat('<') {
        return Err(MailboxError::NoAngleAddr);
    }
    let address = named.addr_spec()?;
    if !named.eat('>') {
        return Err(MailboxError::UnclosedAngle);
    }
    named.skip_cfws()?;
    if !named.at_end() {
        return Err(MailboxError::TrailingInput);
    }

    Ok(Mailbox {
        name: (!name.is_empty()).then_some(name),
        address,
    })
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
        || (!c.is_ascii() && !c.is_control() && !c.is_whitespace())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn slice(&self, start: usize) -> &'a str {
        let input = self.input;
        &input[start..self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Skips whitespace and (nested) comments. Returns whether anything was
    /// skipped.
    fn skip_cfws(&mut self) -> Result<bool, MailboxError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('(') => self.comment()?,
                _ => break,
            }
        }
        Ok(self.pos != start)
    }

    fn comment(&mut self) -> Result<(), MailboxError> {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                '\\' => {
                    self.bump();
                }
                _ => {}
            }
        }
        Err(MailboxError::UnclosedComment)
    }

    fn atom(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_atext) {
            self.bump();
        }
        self.slice(start)
    }

    /// `atom *("." atom)` with no empty atoms.
    fn dot_atom(&mut self) -> Option<&'a str> {
        let start = self.pos;
        loop {
            if self.atom().is_empty() {
                return None;
            }
            if !self.eat('.') {
                break;
            }
        }
        Some(self.slice(start))
    }

    /// Consumes a quoted-string and returns it with its quotes, escapes kept.
    fn quoted_string(&mut self) -> Result<&'a str, MailboxError> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('"') => return Ok(self.slice(start)),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(MailboxError::UnclosedQuote);
                    }
                }
                Some(c) if c.is_control() && c != '\t' => {
                    return Err(MailboxError::InvalidLocalPart);
                }
                Some(_) => {}
                None => return Err(MailboxError::UnclosedQuote),
            }
        }
    }

    fn addr_spec(&mut self) -> Result<String, MailboxError> {
        self.skip_cfws()?;
        let local = match self.peek() {
            Some('"') => self.quoted_string()?,
            _ => self.dot_atom().ok_or(MailboxError::InvalidLocalPart)?,
        };

        let spaced = self.skip_cfws()?;
        if !self.eat('@') {
            return Err(match self.peek() {
                Some(c) if spaced && (is_atext(c) || c == '"') => {
                    MailboxError::LocalPartWhitespace
                }
                _ => MailboxError::MissingAt,
            });
        }
        self.skip_cfws()?;

        let domain = if self.peek() == Some('[') {
            self.domain_literal()?
        } else {
            self.dot_atom().ok_or(MailboxError::InvalidDomain)?
        };

        Ok(format!("{local}@{domain}"))
    }

    fn domain_literal(&mut self) -> Result<&'a str, MailboxError> {
        let start = self.pos;
        self.bump();
        while let Some(c) = self.bump() {
            match c {
                ']' => return Ok(self.slice(start)),
                '[' | '\\' => return Err(MailboxError::InvalidDomain),
                c if c.is_whitespace() || c.is_control() => {
                    return Err(MailboxError::InvalidDomain);
                }
                _ => {}
            }
        }
        Err(MailboxError::InvalidDomain)
    }

    /// Display name: words (atoms, dotted atoms or quoted-strings) separated
    /// by CFWS. Quoted words are unescaped.
    fn phrase(&mut self) -> Result<String, MailboxError> {
        let mut words = Vec::new();
        loop {
            self.skip_cfws()?;
            match self.peek() {
                Some('"') => {
                    let quoted = self.quoted_string()?;
                    words.push(unquote(quoted));
                }
                Some(c) if is_atext(c) || c == '.' => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| is_atext(c) || c == '.') {
                        self.bump();
                    }
                    words.push(self.slice(start).to_string());
                }
                _ => break,
            }
        }
        Ok(words.join(" "))
    }
}

fn unquote(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
