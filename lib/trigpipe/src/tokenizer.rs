//! The second stage: code points to tokens.

use crate::chars::{
    is_forbidden_in_iri, is_pn_chars, is_pn_chars_base, is_pn_chars_u, is_pn_local_esc,
    is_whitespace,
};
use crate::decoder::Rune;
use crate::error::{TextPosition, TriGParseError, TriGSyntaxError};
use crate::token::{NumberKind, Token, TokenWithPosition};
use std::collections::VecDeque;

/// Turns a sequence of [`Rune`]s into a sequence of [`TokenWithPosition`].
///
/// Errors of the input are forwarded as they are.
/// The iterator is fused after it returned an error.
pub struct Tokenizer<I> {
    input: I,
    lookahead: VecDeque<Rune>,
    end: TextPosition,
    is_ending: bool,
}

type TokenizerResult<T> = Result<T, TriGParseError>;

impl<I: Iterator<Item = Result<Rune, TriGParseError>>> Tokenizer<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            lookahead: VecDeque::new(),
            end: TextPosition::default(),
            is_ending: false,
        }
    }

    fn next_rune(&mut self) -> TokenizerResult<Option<Rune>> {
        let rune = match self.lookahead.pop_front() {
            Some(rune) => rune,
            None => match self.input.next().transpose()? {
                Some(rune) => rune,
                None => return Ok(None),
            },
        };
        self.end = position_after(rune);
        Ok(Some(rune))
    }

    fn peek_rune(&mut self) -> TokenizerResult<Option<char>> {
        if self.lookahead.is_empty() {
            let Some(rune) = self.input.next().transpose()? else {
                return Ok(None);
            };
            self.lookahead.push_back(rune);
        }
        Ok(self.lookahead.front().map(|r| r.value))
    }

    /// Gives back the last consumed code point.
    fn unread(&mut self, rune: Rune) {
        self.end = rune.position;
        self.lookahead.push_front(rune);
    }

    /// Consumes the next code point if it is `expected`.
    fn eat(&mut self, expected: char) -> TokenizerResult<bool> {
        if self.peek_rune()? == Some(expected) {
            self.next_rune()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn error(&self, start: TextPosition, message: impl Into<String>) -> TriGParseError {
        TriGSyntaxError::lexical(start..self.end, message).into()
    }

    fn skip_whitespace_and_comments(&mut self) -> TokenizerResult<()> {
        while let Some(c) = self.peek_rune()? {
            if is_whitespace(c) {
                self.next_rune()?;
            } else if c == '#' {
                while let Some(c) = self.peek_rune()? {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    self.next_rune()?;
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> TokenizerResult<Option<TokenWithPosition>> {
        self.skip_whitespace_and_comments()?;
        let Some(rune) = self.next_rune()? else {
            return Ok(None);
        };
        let start = rune.position;
        let token = match rune.value {
            '"' | '\'' => self.read_string(rune.value, start)?,
            '<' => {
                if self.eat('<')? {
                    if self.eat('(')? {
                        Token::TripleTermOpening
                    } else {
                        Token::ReifiedTripleOpening
                    }
                } else {
                    self.read_iri(start)?
                }
            }
            '>' => {
                if self.eat('>')? {
                    Token::ReifiedTripleClosing
                } else {
                    return Err(self.error(start, "Unexpected '>', did you mean '>>'?"));
                }
            }
            '[' => {
                self.skip_whitespace_and_comments()?;
                if self.eat(']')? {
                    Token::BlankNodeAnonymous
                } else {
                    Token::BlankNodeOpening
                }
            }
            ']' => Token::BlankNodeClosing,
            '(' => {
                self.skip_whitespace_and_comments()?;
                if self.eat(')')? {
                    Token::EmptyCollection
                } else {
                    Token::CollectionOpening
                }
            }
            ')' => self.read_closing_parenthesis()?,
            '{' => {
                if self.eat('|')? {
                    Token::AnnotationOpening
                } else {
                    Token::GraphOpening
                }
            }
            '}' => Token::GraphClosing,
            '|' => {
                if self.eat('}')? {
                    Token::AnnotationClosing
                } else {
                    return Err(self.error(start, "Unexpected '|', did you mean '|}'?"));
                }
            }
            '^' => {
                if self.eat('^')? {
                    Token::DatatypeMarker
                } else {
                    return Err(self.error(start, "Unexpected '^', did you mean '^^'?"));
                }
            }
            '~' => Token::Reifier,
            '.' => {
                if self.peek_rune()?.is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number(rune.value, start)?
                } else {
                    Token::Dot
                }
            }
            ';' => Token::SemiColumn,
            ',' => Token::Coma,
            '_' => {
                if self.eat(':')? {
                    self.read_blank_node_label(start)?
                } else {
                    return Err(self.error(start, "Unexpected '_', did you mean '_:'?"));
                }
            }
            '+' | '-' | '0'..='9' => self.read_number(rune.value, start)?,
            '@' => self.read_at_keyword_or_lang_tag(start)?,
            ':' => self.read_local_name(String::new())?,
            c if is_pn_chars_base(c) => self.read_prefix_or_keyword(c, start)?,
            c => {
                return Err(self.error(start, format!("Unexpected character '{c}'")));
            }
        };
        Ok(Some(TokenWithPosition {
            token,
            location: start..self.end,
        }))
    }

    fn read_closing_parenthesis(&mut self) -> TokenizerResult<Token> {
        if self.peek_rune()? != Some('>') {
            return Ok(Token::CollectionClosing);
        }
        let Some(first) = self.next_rune()? else {
            return Ok(Token::CollectionClosing);
        };
        if self.eat('>')? {
            Ok(Token::TripleTermClosing)
        } else {
            self.unread(first);
            Ok(Token::CollectionClosing)
        }
    }

    // [22]  STRING_LITERAL_QUOTE  ::=  '"' ([^#x22#x5C#xA#xD] | ECHAR | UCHAR)* '"'
    // [24]  STRING_LITERAL_LONG_SINGLE_QUOTE  ::=  "'''" (("'" | "''")? ([^'\] | ECHAR | UCHAR))* "'''"
    fn read_string(&mut self, quote: char, start: TextPosition) -> TokenizerResult<Token> {
        if self.eat(quote)? {
            return if self.eat(quote)? {
                self.read_long_string(quote, start)
            } else {
                Ok(Token::String(String::new()))
            };
        }
        let mut value = String::new();
        loop {
            let Some(rune) = self.next_rune()? else {
                return Err(self.error(start, "Unterminated string, the closing quote is missing"));
            };
            match rune.value {
                c if c == quote => return Ok(Token::String(value)),
                '\n' | '\r' => {
                    return Err(self.error(
                        start,
                        "Line breaks are not allowed in short strings, use \\n or a long string",
                    ));
                }
                '\\' => self.read_string_escape(&mut value, start)?,
                c => value.push(c),
            }
        }
    }

    fn read_long_string(&mut self, quote: char, start: TextPosition) -> TokenizerResult<Token> {
        let mut value = String::new();
        let mut closing_quotes = 0;
        loop {
            let Some(rune) = self.next_rune()? else {
                return Err(self.error(
                    start,
                    format!(
                        "Unterminated long string, the closing {quote}{quote}{quote} is missing"
                    ),
                ));
            };
            if rune.value == quote {
                closing_quotes += 1;
                if closing_quotes == 3 {
                    return Ok(Token::String(value));
                }
                continue;
            }
            for _ in 0..closing_quotes {
                value.push(quote);
            }
            closing_quotes = 0;
            if rune.value == '\\' {
                self.read_string_escape(&mut value, start)?;
            } else {
                value.push(rune.value);
            }
        }
    }

    /// Escapes of strings: unknown escapes and broken Unicode escapes are kept as written.
    // [159s]  ECHAR  ::=  '\' [tbnrf"'\]
    fn read_string_escape(
        &mut self,
        value: &mut String,
        start: TextPosition,
    ) -> TokenizerResult<()> {
        let Some(rune) = self.next_rune()? else {
            return Err(self.error(start, "Unterminated string, the closing quote is missing"));
        };
        match rune.value {
            't' => value.push('\t'),
            'b' => value.push('\u{08}'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            'f' => value.push('\u{0C}'),
            '"' => value.push('"'),
            '\'' => value.push('\''),
            '\\' => value.push('\\'),
            'u' => self.read_lenient_unicode_escape(rune.value, 4, value)?,
            'U' => self.read_lenient_unicode_escape(rune.value, 8, value)?,
            c => {
                value.push('\\');
                value.push(c);
            }
        }
        Ok(())
    }

    fn read_lenient_unicode_escape(
        &mut self,
        marker: char,
        len: usize,
        value: &mut String,
    ) -> TokenizerResult<()> {
        let mut digits = String::with_capacity(len);
        while digits.len() < len {
            match self.peek_rune()? {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.next_rune()?;
                    digits.push(c);
                }
                _ => break,
            }
        }
        match u32::from_str_radix(&digits, 16)
            .ok()
            .filter(|_| digits.len() == len)
            .and_then(char::from_u32)
        {
            Some(c) => value.push(c),
            None => {
                value.push('\\');
                value.push(marker);
                value.push_str(&digits);
            }
        }
        Ok(())
    }

    // [18]  IRIREF  ::=  '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
    fn read_iri(&mut self, start: TextPosition) -> TokenizerResult<Token> {
        let mut iri = String::new();
        loop {
            let Some(rune) = self.next_rune()? else {
                return Err(self.error(start, "Unterminated IRI, the closing '>' is missing"));
            };
            match rune.value {
                '>' => return Ok(Token::Iri(iri)),
                '\\' => iri.push(self.read_strict_unicode_escape(rune.position)?),
                c if is_forbidden_in_iri(c) => {
                    return Err(self.error(
                        start,
                        format!("The character {c:?} is not allowed in IRIs, escape it with \\u"),
                    ));
                }
                c => iri.push(c),
            }
        }
    }

    // [26]  UCHAR  ::=  '\u' HEX HEX HEX HEX | '\U' HEX HEX HEX HEX HEX HEX HEX HEX
    fn read_strict_unicode_escape(&mut self, start: TextPosition) -> TokenizerResult<char> {
        let len = match self.next_rune()?.map(|r| r.value) {
            Some('u') => 4,
            Some('U') => 8,
            _ => {
                return Err(self.error(start, "Only \\u and \\U escapes are allowed in IRIs"));
            }
        };
        let mut code_point = 0;
        for _ in 0..len {
            let digit = self
                .next_rune()?
                .and_then(|r| r.value.to_digit(16))
                .ok_or_else(|| {
                    self.error(start, "Unicode escapes must have exactly 4 or 8 hexadecimal digits")
                })?;
            code_point = code_point * 16 + digit;
        }
        char::from_u32(code_point).ok_or_else(|| {
            self.error(
                start,
                format!("The escaped code point {code_point:X} is not a valid Unicode character"),
            )
        })
    }

    // [141s]  BLANK_NODE_LABEL  ::=  '_:' (PN_CHARS_U | [0-9]) ((PN_CHARS | '.')* PN_CHARS)?
    fn read_blank_node_label(&mut self, start: TextPosition) -> TokenizerResult<Token> {
        let mut label = String::new();
        match self.next_rune()? {
            Some(rune) if is_pn_chars_u(rune.value) || rune.value.is_ascii_digit() => {
                label.push(rune.value);
            }
            _ => {
                return Err(self.error(
                    start,
                    "Blank node labels must start with a letter, a digit or '_'",
                ));
            }
        }
        let mut dots = Vec::new();
        while let Some(c) = self.peek_rune()? {
            if c == '.' {
                dots.extend(self.next_rune()?);
            } else if is_pn_chars(c) {
                self.next_rune()?;
                flush_dots(&mut dots, &mut label);
                label.push(c);
            } else {
                break;
            }
        }
        self.unread_dots(dots);
        Ok(Token::BlankNodeLabel(label))
    }

    fn unread_dots(&mut self, dots: Vec<Rune>) {
        for dot in dots.into_iter().rev() {
            self.unread(dot);
        }
    }

    // [19]  INTEGER  ::=  [+-]? [0-9]+
    // [20]  DECIMAL  ::=  [+-]? [0-9]* '.' [0-9]+
    // [21]  DOUBLE  ::=  [+-]? ([0-9]+ '.' [0-9]* EXPONENT | '.' [0-9]+ EXPONENT | [0-9]+ EXPONENT)
    fn read_number(&mut self, first: char, start: TextPosition) -> TokenizerResult<Token> {
        let mut lexical = String::new();
        lexical.push(first);
        let mut kind = NumberKind::Integer;
        let mut has_digits = first.is_ascii_digit();
        if first == '.' {
            kind = NumberKind::Decimal;
        } else {
            has_digits |= self.read_digits(&mut lexical)?;
            if self.peek_rune()? == Some('.') {
                let Some(dot) = self.next_rune()? else {
                    return Err(self.error(start, "Unexpected end of number"));
                };
                match self.peek_rune()? {
                    Some(c) if c.is_ascii_digit() => {
                        lexical.push('.');
                        kind = NumberKind::Decimal;
                    }
                    Some('e' | 'E') if has_digits => {
                        lexical.push('.');
                    }
                    _ => self.unread(dot),
                }
            }
        }
        if kind == NumberKind::Decimal {
            has_digits |= self.read_digits(&mut lexical)?;
        }
        if !has_digits {
            return Err(self.error(start, "A number must contain at least one digit"));
        }
        if let Some(c @ ('e' | 'E')) = self.peek_rune()? {
            self.next_rune()?;
            lexical.push(c);
            if let Some(sign @ ('+' | '-')) = self.peek_rune()? {
                self.next_rune()?;
                lexical.push(sign);
            }
            if !self.read_digits(&mut lexical)? {
                return Err(self.error(start, "A number exponent must contain at least one digit"));
            }
            kind = NumberKind::Double;
        }
        Ok(Token::Number { lexical, kind })
    }

    fn read_digits(&mut self, lexical: &mut String) -> TokenizerResult<bool> {
        let mut found = false;
        while let Some(c) = self.peek_rune()? {
            if !c.is_ascii_digit() {
                break;
            }
            self.next_rune()?;
            lexical.push(c);
            found = true;
        }
        Ok(found)
    }

    // [144s]  LANG_DIR  ::=  '@' [a-zA-Z]+ ('-' [a-zA-Z0-9]+)* ('--' [a-zA-Z]+)?
    fn read_at_keyword_or_lang_tag(&mut self, start: TextPosition) -> TokenizerResult<Token> {
        let mut language = String::new();
        self.read_while(&mut language, |c| c.is_ascii_alphabetic())?;
        if language.is_empty() {
            return Err(self.error(start, "A language tag must start with a letter"));
        }
        if self.peek_rune()? != Some('-') {
            match language.as_str() {
                "prefix" => return Ok(Token::PrefixDirective),
                "base" => return Ok(Token::BaseDirective),
                _ => (),
            }
        }
        let mut direction = None;
        while self.eat('-')? {
            if self.eat('-')? {
                let mut value = String::new();
                self.read_while(&mut value, |c| c.is_ascii_alphabetic())?;
                if value.is_empty() {
                    return Err(self.error(start, "The base direction after '--' is empty"));
                }
                direction = Some(value);
                break;
            }
            language.push('-');
            let len = language.len();
            self.read_while(&mut language, |c| c.is_ascii_alphanumeric())?;
            if language.len() == len {
                return Err(self.error(start, "Language subtags must not be empty"));
            }
        }
        Ok(Token::LangTag {
            language,
            direction,
        })
    }

    fn read_while(
        &mut self,
        buffer: &mut String,
        predicate: impl Fn(char) -> bool,
    ) -> TokenizerResult<()> {
        while let Some(c) = self.peek_rune()? {
            if !predicate(c) {
                break;
            }
            self.next_rune()?;
            buffer.push(c);
        }
        Ok(())
    }

    // [139s]  PNAME_NS  ::=  PN_PREFIX? ':'
    // [167s]  PN_PREFIX  ::=  PN_CHARS_BASE ((PN_CHARS | '.')* PN_CHARS)?
    fn read_prefix_or_keyword(
        &mut self,
        first: char,
        start: TextPosition,
    ) -> TokenizerResult<Token> {
        let mut prefix = String::new();
        prefix.push(first);
        let mut dots = Vec::new();
        while let Some(c) = self.peek_rune()? {
            if c == '.' {
                dots.extend(self.next_rune()?);
            } else if is_pn_chars(c) {
                self.next_rune()?;
                flush_dots(&mut dots, &mut prefix);
                prefix.push(c);
            } else {
                break;
            }
        }
        if self.peek_rune()? == Some(':') {
            if !dots.is_empty() {
                return Err(self.error(start, "A prefix name must not end with '.'"));
            }
            self.next_rune()?;
            return self.read_local_name(prefix);
        }
        self.unread_dots(dots);
        Ok(match prefix.as_str() {
            "a" => Token::A,
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            word if word.eq_ignore_ascii_case("PREFIX") => Token::SparqlPrefix,
            word if word.eq_ignore_ascii_case("BASE") => Token::SparqlBase,
            word if word.eq_ignore_ascii_case("GRAPH") => Token::Graph,
            word => {
                return Err(self.error(
                    start,
                    format!("Unknown keyword '{word}', prefixed names must contain a ':'"),
                ));
            }
        })
    }

    // [168s]  PN_LOCAL  ::=  (PN_CHARS_U | ':' | [0-9] | PLX) ((PN_CHARS | '.' | ':' | PLX)* (PN_CHARS | ':' | PLX))?
    fn read_local_name(&mut self, prefix: String) -> TokenizerResult<Token> {
        let mut local = String::new();
        let mut dots = Vec::new();
        let mut is_first = true;
        while let Some(c) = self.peek_rune()? {
            let is_name_char = if is_first {
                is_pn_chars_u(c) || c.is_ascii_digit() || c == ':'
            } else {
                is_pn_chars(c) || c == ':'
            };
            if is_name_char {
                self.next_rune()?;
                flush_dots(&mut dots, &mut local);
                local.push(c);
            } else if c == '.' && !is_first {
                dots.extend(self.next_rune()?);
            } else if c == '%' {
                let Some(rune) = self.next_rune()? else {
                    break;
                };
                flush_dots(&mut dots, &mut local);
                local.push('%');
                for _ in 0..2 {
                    match self.next_rune()? {
                        Some(digit) if digit.value.is_ascii_hexdigit() => local.push(digit.value),
                        _ => {
                            return Err(self.error(
                                rune.position,
                                "'%' must be followed by two hexadecimal digits",
                            ));
                        }
                    }
                }
            } else if c == '\\' {
                let Some(rune) = self.next_rune()? else {
                    break;
                };
                match self.next_rune()? {
                    Some(escaped) if is_pn_local_esc(escaped.value) => {
                        flush_dots(&mut dots, &mut local);
                        local.push(escaped.value);
                    }
                    _ => {
                        return Err(self.error(
                            rune.position,
                            "Invalid escape in a local name, only \\ followed by one of _~.-!$&'()*+,;=/?#@% is allowed",
                        ));
                    }
                }
            } else {
                break;
            }
            is_first = false;
        }
        self.unread_dots(dots);
        Ok(if local.is_empty() {
            Token::PNameNs { prefix }
        } else {
            Token::PNameLn { prefix, local }
        })
    }
}

impl<I: Iterator<Item = Result<Rune, TriGParseError>>> Iterator for Tokenizer<I> {
    type Item = Result<TokenWithPosition, TriGParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_ending {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.is_ending = true;
                None
            }
            Err(e) => {
                self.is_ending = true;
                Some(Err(e))
            }
        }
    }
}

fn position_after(rune: Rune) -> TextPosition {
    let mut position = rune.position;
    position.offset += rune.value.len_utf8() as u64;
    if rune.value == '\n' {
        position.line += 1;
        position.column = 0;
    } else {
        position.column += 1;
    }
    position
}

fn flush_dots(dots: &mut Vec<Rune>, buffer: &mut String) {
    for dot in dots.drain(..) {
        buffer.push(dot.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::RuneDecoder;
    use crate::error::SyntaxErrorKind;

    fn tokenize(text: &str) -> Result<Vec<Token>, TriGParseError> {
        Tokenizer::new(RuneDecoder::new(text.as_bytes(), 3))
            .map(|t| t.map(|t| t.token))
            .collect()
    }

    fn lexical_error(text: &str) -> String {
        match tokenize(text) {
            Err(TriGParseError::Syntax(e)) => {
                assert_eq!(e.kind(), SyntaxErrorKind::Lexical, "{text}");
                e.message().to_owned()
            }
            other => panic!("{text} should be a lexical error, got {other:?}"),
        }
    }

    fn string(value: &str) -> Token {
        Token::String(value.into())
    }

    fn pname(prefix: &str, local: &str) -> Token {
        Token::PNameLn {
            prefix: prefix.into(),
            local: local.into(),
        }
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            tokenize("[ ] [ # comment\n ] [ a ( ) ( 1 ) . ; , { } {| |} << >> <<( )>> ^^ ~")
                .unwrap(),
            [
                Token::BlankNodeAnonymous,
                Token::BlankNodeAnonymous,
                Token::BlankNodeOpening,
                Token::A,
                Token::EmptyCollection,
                Token::CollectionOpening,
                Token::Number {
                    lexical: "1".into(),
                    kind: NumberKind::Integer
                },
                Token::CollectionClosing,
                Token::Dot,
                Token::SemiColumn,
                Token::Coma,
                Token::GraphOpening,
                Token::GraphClosing,
                Token::AnnotationOpening,
                Token::AnnotationClosing,
                Token::ReifiedTripleOpening,
                Token::ReifiedTripleClosing,
                Token::TripleTermOpening,
                Token::TripleTermClosing,
                Token::DatatypeMarker,
                Token::Reifier,
            ]
        );
    }

    #[test]
    fn collection_closing_before_reified_closing() {
        assert_eq!(
            tokenize("( 1 )>").map_err(|e| e.to_string()).unwrap_err(),
            "Parser error at line 1 column 6: Unexpected '>', did you mean '>>'?"
        );
        assert_eq!(
            tokenize("(1)]").unwrap(),
            [
                Token::CollectionOpening,
                Token::Number {
                    lexical: "1".into(),
                    kind: NumberKind::Integer
                },
                Token::CollectionClosing,
                Token::BlankNodeClosing,
            ]
        );
    }

    #[test]
    fn strings() {
        assert_eq!(
            tokenize(r#""a" 'b' "" '' """c""" '''d''' "e\tfé\U0001F600""#).unwrap(),
            [
                string("a"),
                string("b"),
                string(""),
                string(""),
                string("c"),
                string("d"),
                string("e\tfé😀"),
            ]
        );
    }

    #[test]
    fn long_string_with_inner_quotes() {
        assert_eq!(tokenize(r#""""a""b""""#).unwrap(), [string("a\"\"b")]);
        assert_eq!(
            tokenize("'''a\n'b'' '''").unwrap(),
            [string("a\n'b'' ")]
        );
    }

    #[test]
    fn lenient_string_escapes() {
        assert_eq!(
            tokenize(r#""\q \u12 \uZZZZ \uD800""#).unwrap(),
            [string(r"\q \u12 \uZZZZ \uD800")]
        );
    }

    #[test]
    fn string_errors() {
        assert!(lexical_error("\"abc").contains("Unterminated string"));
        assert!(lexical_error("\"\"\"abc\"\"").contains("Unterminated long string"));
        assert!(lexical_error("\"a\nb\"").contains("Line breaks"));
    }

    #[test]
    fn iris() {
        assert_eq!(
            tokenize(r"<http://example.com/é> <> <#a>").unwrap(),
            [
                Token::Iri("http://example.com/é".into()),
                Token::Iri(String::new()),
                Token::Iri("#a".into()),
            ]
        );
        assert!(lexical_error(r"<http://example.com/\n>").contains("Only \\u and \\U"));
        assert!(lexical_error(r"<http://example.com/\u00>").contains("hexadecimal"));
        assert!(lexical_error("<http://example.com/ a>").contains("not allowed in IRIs"));
        assert!(lexical_error("<http://example.com/").contains("Unterminated IRI"));
    }

    #[test]
    fn blank_node_labels() {
        assert_eq!(
            tokenize("_:a _:1.b _:c. _:d-").unwrap(),
            [
                Token::BlankNodeLabel("a".into()),
                Token::BlankNodeLabel("1.b".into()),
                Token::BlankNodeLabel("c".into()),
                Token::Dot,
                Token::BlankNodeLabel("d-".into()),
            ]
        );
        assert!(lexical_error("_:-a").contains("must start with"));
        assert!(lexical_error("_a").contains("did you mean '_:'"));
    }

    #[test]
    fn numbers() {
        let number = |lexical: &str, kind| Token::Number {
            lexical: lexical.into(),
            kind,
        };
        assert_eq!(
            tokenize("1 -2 +3.5 .5 1e3 1.2E-3 1.e2 4.").unwrap(),
            [
                number("1", NumberKind::Integer),
                number("-2", NumberKind::Integer),
                number("+3.5", NumberKind::Decimal),
                number(".5", NumberKind::Decimal),
                number("1e3", NumberKind::Double),
                number("1.2E-3", NumberKind::Double),
                number("1.e2", NumberKind::Double),
                number("4", NumberKind::Integer),
                Token::Dot,
            ]
        );
        assert!(lexical_error("+ 1").contains("at least one digit"));
        assert!(lexical_error("1e+").contains("exponent"));
    }

    #[test]
    fn prefixed_names() {
        assert_eq!(
            tokenize(r"ex: ex:a :b ex:a.b ex:c. ex:d\.e ex:%41 ex:1:2 é:ü").unwrap(),
            [
                Token::PNameNs {
                    prefix: "ex".into()
                },
                pname("ex", "a"),
                pname("", "b"),
                pname("ex", "a.b"),
                pname("ex", "c"),
                Token::Dot,
                pname("ex", "d.e"),
                pname("ex", "%41"),
                pname("ex", "1:2"),
                pname("é", "ü"),
            ]
        );
        assert!(lexical_error(r"ex:a\b").contains("Invalid escape"));
        assert!(lexical_error("ex:%4G").contains("two hexadecimal digits"));
        assert!(lexical_error("ex.:a").contains("must not end with '.'"));
    }

    #[test]
    fn local_name_errors_start_at_the_escape() {
        for text in ["ex:ab%4G", r"ex:ab\b"] {
            let Some(Err(TriGParseError::Syntax(error))) =
                Tokenizer::new(RuneDecoder::new(text.as_bytes(), 4096)).next()
            else {
                panic!("{text} should be a syntax error")
            };
            assert_eq!(error.location().start.offset, 5, "{text}");
        }
    }

    #[test]
    fn keywords() {
        assert_eq!(
            tokenize("a true false PREFIX prefix Base GRAPH a.").unwrap(),
            [
                Token::A,
                Token::Boolean(true),
                Token::Boolean(false),
                Token::SparqlPrefix,
                Token::SparqlPrefix,
                Token::SparqlBase,
                Token::Graph,
                Token::A,
                Token::Dot,
            ]
        );
        assert!(lexical_error("foo").contains("Unknown keyword 'foo'"));
    }

    #[test]
    fn at_keywords_and_lang_tags() {
        let tag = |language: &str, direction: Option<&str>| Token::LangTag {
            language: language.into(),
            direction: direction.map(Into::into),
        };
        assert_eq!(
            tokenize("@prefix @base @en @en-GB @based @ar--rtl @en-US--ltr @base-x").unwrap(),
            [
                Token::PrefixDirective,
                Token::BaseDirective,
                tag("en", None),
                tag("en-GB", None),
                tag("based", None),
                tag("ar", Some("rtl")),
                tag("en-US", Some("ltr")),
                tag("base-x", None),
            ]
        );
        assert!(lexical_error("@1").contains("must start with a letter"));
        assert!(lexical_error("@en-").contains("must not be empty"));
        assert!(lexical_error("@en--").contains("direction"));
    }

    #[test]
    fn locations() {
        let tokens = Tokenizer::new(RuneDecoder::new("ex:a\n  \"é\" .".as_bytes(), 4096))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let locations = tokens
            .iter()
            .map(|t| {
                (
                    (t.location.start.line, t.location.start.column),
                    (t.location.end.line, t.location.end.column, t.location.end.offset),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            locations,
            [((0, 0), (0, 4, 4)), ((1, 2), (1, 5, 11)), ((1, 6), (1, 7, 13))]
        );
    }

    #[test]
    fn trailing_dot_location() {
        let tokens = Tokenizer::new(RuneDecoder::new("_:b.".as_bytes(), 4096))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tokens[0].location.end.offset, 3);
        assert_eq!(tokens[1].token, Token::Dot);
        assert_eq!(tokens[1].location.start.offset, 3);
        assert_eq!(tokens[1].location.end.offset, 4);
    }

    #[test]
    fn encoding_errors_stop_tokenization() {
        let mut tokenizer = Tokenizer::new(RuneDecoder::new(b"\x80 ex:a".as_slice(), 4096));
        assert!(matches!(
            tokenizer.next(),
            Some(Err(TriGParseError::Encoding(_)))
        ));
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn fused_after_error() {
        let mut tokenizer = Tokenizer::new(RuneDecoder::new("ex:a foo ex:b".as_bytes(), 4096));
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert!(matches!(tokenizer.next(), Some(Err(_))));
        assert!(tokenizer.next().is_none());
    }
}
