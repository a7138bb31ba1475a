//! Character classes of the Turtle grammar.

// [163s]  PN_CHARS_BASE  ::=  [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6] | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF] | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]
pub fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
    'A'..='Z'
    | 'a'..='z'
    | '\u{00C0}'..='\u{00D6}'
    | '\u{00D8}'..='\u{00F6}'
    | '\u{00F8}'..='\u{02FF}'
    | '\u{0370}'..='\u{037D}'
    | '\u{037F}'..='\u{1FFF}'
    | '\u{200C}'..='\u{200D}'
    | '\u{2070}'..='\u{218F}'
    | '\u{2C00}'..='\u{2FEF}'
    | '\u{3001}'..='\u{D7FF}'
    | '\u{F900}'..='\u{FDCF}'
    | '\u{FDF0}'..='\u{FFFD}'
    | '\u{10000}'..='\u{EFFFF}')
}

// [164s]  PN_CHARS_U  ::=  PN_CHARS_BASE | '_'
pub fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

// [166s]  PN_CHARS  ::=  PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
pub fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || matches!(c,
    '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

// [172s]  PN_LOCAL_ESC  ::=  '\' ('_' | '~' | '.' | '-' | '!' | '$' | '&' | "'" | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '/' | '?' | '#' | '@' | '%')
pub fn is_pn_local_esc(c: char) -> bool {
    matches!(
        c,
        '_' | '~'
            | '.'
            | '-'
            | '!'
            | '$'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | ';'
            | '='
            | '/'
            | '?'
            | '#'
            | '@'
            | '%'
    )
}

/// Characters that may not appear unescaped in an IRIREF.
// [18]  IRIREF  ::=  '<' ([^#x00-#x20<>"{}|^`\] | UCHAR)* '>'
pub fn is_forbidden_in_iri(c: char) -> bool {
    matches!(
        c,
        '\u{00}'..='\u{20}' | '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'
    )
}

// [161s]  WS  ::=  #x20 | #x9 | #xD | #xA
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_classes() {
        assert!(is_pn_chars_base('é'));
        assert!(!is_pn_chars_base('_'));
        assert!(is_pn_chars_u('_'));
        assert!(!is_pn_chars_u('-'));
        assert!(is_pn_chars('-'));
        assert!(is_pn_chars('\u{00B7}'));
        assert!(!is_pn_chars('.'));
        assert!(!is_pn_chars(':'));
    }

    #[test]
    fn escapes_and_iris() {
        assert!(is_pn_local_esc('%'));
        assert!(is_pn_local_esc('~'));
        assert!(!is_pn_local_esc('a'));
        assert!(is_forbidden_in_iri(' '));
        assert!(is_forbidden_in_iri('`'));
        assert!(!is_forbidden_in_iri('#'));
    }
}
