use log::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Let,
    Function,
    Return,
    True,
    False,
    If,
    Else,

    // Literals
    Identifier,
    Number,
    String,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Assign,            // =
    DoubleEquals,      // ==
    NotEquals,         // !=
    LessThan,          // <
    GreaterThan,       // >
    LessThanEquals,    // <=
    GreaterThanEquals, // >=
    Dot,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Semicolon,
    Comma,

    Illegal,
    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::EOF, "")
    }
}

fn lookup_identifier(ident: &str) -> TokenKind {
    match ident {
        "fn" | "function" => TokenKind::Function,
        "let" => TokenKind::Let,
        "return" => TokenKind::Return,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        _ => TokenKind::Identifier,
    }
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Single-pass lexer producing one token per `next_token` call.
///
/// Never fails: bytes it does not recognise come back as `Illegal` tokens, and
/// once the input is exhausted every further call yields `EOF`.
pub struct Lexer<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, position: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.position += 1;
        }
    }

    fn read_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let start = self.position;
        while let Some(c) = self.peek() {
            if !accept(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        &self.source[start..self.position]
    }

    /// Reads up to the closing quote. An unterminated string runs to the end
    /// of input.
    fn read_string(&mut self) -> &'a str {
        let body = self.read_while(|c| c != '"');
        // closing quote, if any
        self.bump();
        body
    }

    /// Emits `two` when the next char is `=`, otherwise `one`.
    fn with_equals(&mut self, one: TokenKind, two: TokenKind) -> Token {
        let start = self.position;
        self.bump();
        if self.peek() == Some('=') {
            self.bump();
            Token::new(two, &self.source[start..self.position])
        } else {
            Token::new(one, &self.source[start..self.position])
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.position;
        self.bump();
        Token::new(kind, &self.source[start..self.position])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek() else {
            return Token::eof();
        };

        let token = match c {
            '=' => self.with_equals(TokenKind::Assign, TokenKind::DoubleEquals),
            '!' => self.with_equals(TokenKind::Bang, TokenKind::NotEquals),
            '<' => self.with_equals(TokenKind::LessThan, TokenKind::LessThanEquals),
            '>' => self.with_equals(TokenKind::GreaterThan, TokenKind::GreaterThanEquals),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '.' => self.single(TokenKind::Dot),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '"' => {
                self.bump();
                Token::new(TokenKind::String, self.read_string())
            }
            c if c.is_ascii_digit() => {
                Token::new(TokenKind::Number, self.read_while(|c| c.is_ascii_digit()))
            }
            c if is_letter(c) => {
                let ident = self.read_while(is_letter);
                Token::new(lookup_identifier(ident), ident)
            }
            _ => self.single(TokenKind::Illegal),
        };

        trace!(target: "javascript", "Lexed {:?} {:?}", token.kind, token.literal);
        token
    }
}

/// Lexes the whole source eagerly. The returned vector always ends with a
/// single `EOF` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_let_statement_tokens() {
        let tokens = tokenize("let x = 5;");
        let expected = vec![
            Token::new(TokenKind::Let, "let"),
            Token::new(TokenKind::Identifier, "x"),
            Token::new(TokenKind::Assign, "="),
            Token::new(TokenKind::Number, "5"),
            Token::new(TokenKind::Semicolon, ";"),
            Token::eof(),
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("== != <= >= < > = !"),
            vec![
                TokenKind::DoubleEquals,
                TokenKind::NotEquals,
                TokenKind::LessThanEquals,
                TokenKind::GreaterThanEquals,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("fn function let return true false if else foo_bar"),
            vec![
                TokenKind::Function,
                TokenKind::Function,
                TokenKind::Let,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::False,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Identifier,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn test_identifiers_stop_at_digits() {
        let tokens = tokenize("abc123");
        assert_eq!(tokens[0], Token::new(TokenKind::Identifier, "abc"));
        assert_eq!(tokens[1], Token::new(TokenKind::Number, "123"));
    }

    #[test]
    fn test_decimal_point_is_not_part_of_number() {
        assert_eq!(
            kinds("1.5"),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Number, TokenKind::EOF]
        );
    }

    #[test]
    fn test_string_literal_has_no_escapes() {
        let tokens = tokenize(r#""a\n" "#);
        assert_eq!(tokens[0], Token::new(TokenKind::String, r"a\n"));
    }

    #[test]
    fn test_unterminated_string_runs_to_end() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens[0], Token::new(TokenKind::String, "abc"));
        assert_eq!(tokens[1].kind, TokenKind::EOF);
    }

    #[test]
    fn test_illegal_characters() {
        let tokens = tokenize("@ é");
        assert_eq!(tokens[0], Token::new(TokenKind::Illegal, "@"));
        assert_eq!(tokens[1], Token::new(TokenKind::Illegal, "é"));
        assert_eq!(tokens[2].kind, TokenKind::EOF);
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
        for _ in 0..5 {
            assert_eq!(lexer.next_token(), Token::eof());
        }
    }
}
