//! A constant-declaration-only assembler front end.
//!
//! Mirrors the scope of the original tool this emulator is paired with:
//! it can lex whitespace and `;`-comments, and parse `name = 0ooo` octal
//! constant declarations into an ordered table, but it stops there. Labels,
//! opcode mnemonics, and hex/decimal literals are deliberately unimplemented
//! and always produce an [`AsmError`], never a panic from unreached code.

use colored::*;

const NAME_MAX_LEN: usize = 16;

/// A position-tagged assembler failure. `position` is a flat character
/// offset into the source text, matching the PRM-distributed tool's
/// `ERROR: Pos. <n>: <reason>` convention.
#[derive(Debug, Clone)]
pub struct AsmError {
    position: usize,
    reason: String,
}

impl AsmError {
    fn new(position: usize, reason: impl Into<String>) -> AsmError {
        AsmError {
            position,
            reason: reason.into(),
        }
    }

    /// Renders as `ERROR: Pos. <n>: <reason>`.
    pub fn message(&self) -> String {
        format!("ERROR: Pos. {}: {}", self.position, self.reason)
    }

    /// A `colored`-highlighted rendering for terminal display: the source
    /// text with a caret under the offending character and the reason in
    /// bright red underneath.
    pub fn nice_message(&self, source: &str) -> String {
        let chars: Vec<char> = source.chars().collect();
        let caret_at = self.position.min(chars.len());

        let mut nice = String::from("\n\n");
        nice.push_str(&format!("{}", source.bright_white()));
        if !source.ends_with('\n') {
            nice.push('\n');
        }
        nice.push_str(&" ".repeat(caret_at));
        nice.push_str(&format!("{}", "^".bright_red()));
        nice.push('\n');
        nice.push_str(&format!("{}", self.message().bright_red()));
        nice.push('\n');
        nice
    }

    pub fn panic_nicely(self, source: &str) -> ! {
        panic!("{}", self.nice_message(source));
    }
}

/// One `name = value` declaration, in the order it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub value: u8,
}

/// The result of running the assembler's constant pass over a source text.
pub struct ConstantTable {
    pub constants: Vec<Constant>,
}

impl ConstantTable {
    pub fn get(&self, name: &str) -> Option<u8> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

fn is_name_continue(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

struct Lexer<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Lexer<'a> {
        Lexer {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Consumes whitespace and `;`-to-end-of-line comments, in any mix,
    /// until neither is found at the current position. Mirrors the
    /// PRM tool's `consume_whitespaces_and_comments`.
    fn consume_whitespace_and_comments(&mut self) {
        loop {
            let mut consumed = false;
            while let Some(c) = self.peek() {
                if !c.is_whitespace() {
                    break;
                }
                self.advance();
                consumed = true;
            }
            if self.peek() == Some(';') {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
                consumed = true;
            }
            if !consumed {
                break;
            }
        }
    }

    /// Reads a `[a-z_][a-z0-9_]*` identifier, if one starts here. Returns
    /// `Ok(None)` if the current character can't begin a name (not an
    /// error, just nothing to read).
    fn try_read_name(&mut self) -> Result<Option<String>, AsmError> {
        let start = self.pos;
        match self.peek() {
            None => return Ok(None),
            Some(c) if !is_name_start(c) => return Ok(None),
            _ => {}
        }

        let mut name = String::new();
        name.push(self.advance().unwrap());

        while let Some(c) = self.peek() {
            if !is_name_continue(c) {
                break;
            }
            if name.len() == NAME_MAX_LEN {
                return Err(AsmError::new(self.pos, "Name is too long!"));
            }
            name.push(self.advance().unwrap());
        }
        debug_assert!(!name.is_empty());
        let _ = start;
        Ok(Some(name))
    }

    /// Reads an octal value literal (`0` followed by one to three octal
    /// digits, most-significant first, top digit restricted to 0-3 since
    /// the result must fit in a byte). Hex (`$`) and bare decimal literals
    /// are recognized only far enough to report them as unimplemented.
    fn read_val(&mut self) -> Result<u8, AsmError> {
        let cur = self
            .peek()
            .ok_or_else(|| AsmError::new(self.pos, "No more input text, expected value!"))?;

        if cur == '$' {
            self.advance();
            return Err(AsmError::new(
                self.pos,
                "Hexadecimal values are not implemented, yet!",
            ));
        }
        if cur != '0' {
            return Err(AsmError::new(
                self.pos,
                "Decimal values are not implemented, yet!",
            ));
        }
        self.advance();

        let mut val: u8 = 0;
        let mut fac: u32 = 64;
        loop {
            let digit = self
                .peek()
                .ok_or_else(|| AsmError::new(self.pos, "Value ended mid-literal!"))?;
            self.advance();

            if digit < '0' {
                return Err(AsmError::new(
                    self.pos,
                    "Invalid octal digit detected (must be at least 0)!",
                ));
            }
            let max_digit = if fac == 64 { '3' } else { '7' };
            if digit > max_digit {
                return Err(AsmError::new(
                    self.pos,
                    format!(
                        "Invalid octal digit detected (must be at most {})!",
                        max_digit
                    ),
                ));
            }

            let digit_val = (digit as u32) - ('0' as u32);
            val = val.wrapping_add((digit_val * fac) as u8);

            if fac == 1 {
                break;
            }
            fac /= 8;
        }

        let before = self.pos;
        self.consume_whitespace_and_comments();
        if self.pos == before && self.peek().is_some() {
            return Err(AsmError::new(
                self.pos,
                "Expected white-space and/or comment after read value!",
            ));
        }

        Ok(val)
    }

    /// Reads one `name = value` declaration, if a name starts here.
    /// `Ok(None)` means nothing was found (end of constant section, not
    /// an error).
    fn try_read_constant(&mut self) -> Result<Option<Constant>, AsmError> {
        let before_name = self.pos;
        let name = match self.try_read_name()? {
            Some(name) => name,
            None => return Ok(None),
        };

        self.consume_whitespace_and_comments();

        match self.peek() {
            None => {
                return Err(AsmError::new(
                    self.pos,
                    "No more input text, expected value of constant (or something else)!",
                ))
            }
            Some('=') => {
                self.advance();
            }
            Some(_) => {
                // Not a constant declaration after all; caller treats this
                // as "no constant found" and leaves position untouched.
                self.pos = before_name;
                return Ok(None);
            }
        }

        self.consume_whitespace_and_comments();
        let value = self.read_val()?;

        Ok(Some(Constant { name, value }))
    }
}

/// Parses every `name = value` declaration at the head of `source`, in the
/// order declared. Stops (without error) at the first token that isn't a
/// constant declaration — that's as far as this assembler goes; anything
/// past the constants (labels, opcodes, directives) is out of scope and
/// callers should treat remaining text as unsupported.
pub fn parse_constants(source: &str) -> Result<ConstantTable, AsmError> {
    let mut lexer = Lexer::new(source);
    lexer.consume_whitespace_and_comments();

    let mut constants = Vec::new();
    loop {
        match lexer.try_read_constant()? {
            Some(constant) => {
                if constants.iter().any(|c: &Constant| c.name == constant.name) {
                    return Err(AsmError::new(
                        lexer.pos,
                        format!("Constant '{}' is already declared!", constant.name),
                    ));
                }
                constants.push(constant);
            }
            None => break,
        }
    }

    Ok(ConstantTable { constants })
}

/// Full assembly is out of scope: label resolution and opcode emission
/// are not implemented. This always returns an error once the constant
/// section has been consumed, the same place the reference tool stops.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let table = parse_constants(source)?;
    let mut lexer = Lexer::new(source);
    lexer.consume_whitespace_and_comments();
    for _ in 0..table.constants.len() {
        lexer
            .try_read_constant()?
            .expect("parse_constants already validated this many declarations exist");
    }

    Err(AsmError::new(
        lexer.pos,
        "Not implemented! Only constant declarations are supported.",
    ))
}
