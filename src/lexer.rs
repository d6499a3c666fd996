use super::token::{TokenType, Token, look_up_ident};

/// Turns one line of source text into tokens.
///
/// `next_token` keeps returning `EOF` once the input is used up. The
/// `Iterator` impl stops before the `EOF` marker instead.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    read_position: usize,
    ch: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut l = Lexer {
            input: input.chars().collect(),
            position: 0,
            read_position: 0,
            ch: None,
        };
        l.read_char();
        l
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_white_space();

        let ch = match self.ch {
            None => return Token::new(TokenType::EOF, ""),
            Some(ch) => ch,
        };

        let tok = match ch {
            '=' => if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenType::EQ, "==")
                } else {
                    new_token(TokenType::ASSIGN, ch)
                },
            '!' => if self.peek_char() == Some('=') {
                    self.read_char();
                    Token::new(TokenType::NotEq, "!=")
                } else {
                    new_token(TokenType::BANG, ch)
                },
            '+' => new_token(TokenType::PLUS, ch),
            '-' => new_token(TokenType::MINUS, ch),
            '*' => new_token(TokenType::ASTERISK, ch),
            '/' => new_token(TokenType::SLASH, ch),
            '<' => new_token(TokenType::LT, ch),
            '>' => new_token(TokenType::GT, ch),
            ';' => new_token(TokenType::SEMICOLON, ch),
            ':' => new_token(TokenType::COLON, ch),
            ',' => new_token(TokenType::COMMA, ch),
            '{' => new_token(TokenType::LBRACE, ch),
            '}' => new_token(TokenType::RBRACE, ch),
            '(' => new_token(TokenType::LPAREN, ch),
            ')' => new_token(TokenType::RPAREN, ch),
            '[' => new_token(TokenType::LBRACKET, ch),
            ']' => new_token(TokenType::RBRACKET, ch),
            '"' => Token::new(TokenType::STRING, self.read_string()),
            _ => if is_letter(ch) {
                let literal = self.read_identifier();
                // read_identifier already sits on the next char
                return Token::new(look_up_ident(&literal), literal);
            } else if is_digit(ch) {
                let literal = self.read_number();
                return Token::new(TokenType::INT, literal);
            } else {
                new_token(TokenType::ILLEGAL, ch)
            },
        };
        self.read_char();

        tok
    }

    fn skip_white_space(&mut self) {
        while matches!(self.ch, Some(' ' | '\t' | '\n' | '\r')) {
            self.read_char();
        }
    }

    fn read_char(&mut self) {
        self.ch = self.input.get(self.read_position).copied();
        self.position = self.read_position;
        if self.read_position <= self.input.len() {
            self.read_position += 1;
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.read_position).copied()
    }

    fn read_while(&mut self, pred: fn(char) -> bool) -> String {
        let position = self.position;
        while self.ch.is_some_and(pred) {
            self.read_char();
        }
        self.input[position..self.position].iter().collect()
    }

    fn read_identifier(&mut self) -> String {
        // digits are allowed after the first char
        self.read_while(|c| is_letter(c) || is_digit(c))
    }

    fn read_number(&mut self) -> String {
        self.read_while(is_digit)
    }

    /// Reads up to the closing quote, or to end of input when there is none.
    /// Leaves `ch` on the closing quote.
    fn read_string(&mut self) -> String {
        let position = self.position + 1;
        loop {
            self.read_char();
            if matches!(self.ch, Some('"') | None) {
                break;
            }
        }
        let end = self.position.min(self.input.len());
        self.input[position..end].iter().collect()
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let tok = self.next_token();
        if tok.is_eof() {
            None
        } else {
            Some(tok)
        }
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn new_token(token_type: TokenType, ch: char) -> Token {
    Token::new(token_type, ch.to_string())
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::token::TokenType;

    #[test]
    fn test_lexer() {
        let input = r#"let a1 = 2+3;
let add = fn(x, y) {
    x + y;
}

let result = add(five, ten);
!-/*5;
5 < 10 > 3;
if(5<10) {
    return true
} else {
    return false
}
10 == 10
10 != 9
"foo bar"
[1, 2];
{"foo": "bar"}"#;

        let expected_tokens = vec![
            (TokenType::LET, "let"),
            (TokenType::IDENT, "a1"),
            (TokenType::ASSIGN, "="),
            (TokenType::INT, "2"),
            (TokenType::PLUS, "+"),
            (TokenType::INT, "3"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::LET, "let"),
            (TokenType::IDENT, "add"),
            (TokenType::ASSIGN, "="),
            (TokenType::FUNCTION, "fn"),
            (TokenType::LPAREN, "("),
            (TokenType::IDENT, "x"),
            (TokenType::COMMA, ","),
            (TokenType::IDENT, "y"),
            (TokenType::RPAREN, ")"),
            (TokenType::LBRACE, "{"),
            (TokenType::IDENT, "x"),
            (TokenType::PLUS, "+"),
            (TokenType::IDENT, "y"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::RBRACE, "}"),
            (TokenType::LET, "let"),
            (TokenType::IDENT, "result"),
            (TokenType::ASSIGN, "="),
            (TokenType::IDENT, "add"),
            (TokenType::LPAREN, "("),
            (TokenType::IDENT, "five"),
            (TokenType::COMMA, ","),
            (TokenType::IDENT, "ten"),
            (TokenType::RPAREN, ")"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::BANG, "!"),
            (TokenType::MINUS, "-"),
            (TokenType::SLASH, "/"),
            (TokenType::ASTERISK, "*"),
            (TokenType::INT, "5"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::INT, "5"),
            (TokenType::LT, "<"),
            (TokenType::INT, "10"),
            (TokenType::GT, ">"),
            (TokenType::INT, "3"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::IF, "if"),
            (TokenType::LPAREN, "("),
            (TokenType::INT, "5"),
            (TokenType::LT, "<"),
            (TokenType::INT, "10"),
            (TokenType::RPAREN, ")"),
            (TokenType::LBRACE, "{"),
            (TokenType::RETURN, "return"),
            (TokenType::TRUE, "true"),
            (TokenType::RBRACE, "}"),
            (TokenType::ELSE, "else"),
            (TokenType::LBRACE, "{"),
            (TokenType::RETURN, "return"),
            (TokenType::FALSE, "false"),
            (TokenType::RBRACE, "}"),
            (TokenType::INT, "10"),
            (TokenType::EQ, "=="),
            (TokenType::INT, "10"),
            (TokenType::INT, "10"),
            (TokenType::NotEq, "!="),
            (TokenType::INT, "9"),
            (TokenType::STRING, "foo bar"),
            (TokenType::LBRACKET, "["),
            (TokenType::INT, "1"),
            (TokenType::COMMA, ","),
            (TokenType::INT, "2"),
            (TokenType::RBRACKET, "]"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::LBRACE, "{"),
            (TokenType::STRING, "foo"),
            (TokenType::COLON, ":"),
            (TokenType::STRING, "bar"),
            (TokenType::RBRACE, "}"),
            (TokenType::EOF, ""),
        ];

        let mut l = Lexer::new(input);

        for (i, (exp_type, exp_literal)) in expected_tokens.iter().enumerate() {
            let tok = l.next_token();
            assert_eq!(tok.token_type, *exp_type, "test {}: wrong token type", i);
            assert_eq!(tok.literal, *exp_literal, "test {}: wrong literal", i);
        }
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut l = Lexer::new("x");
        assert_eq!(l.next_token().token_type, TokenType::IDENT);
        for _ in 0..3 {
            assert_eq!(l.next_token().token_type, TokenType::EOF);
        }
    }

    #[test]
    fn test_iterator_stops_before_eof() {
        let types: Vec<TokenType> = Lexer::new("let x = 5;").map(|t| t.token_type).collect();
        assert_eq!(types, vec![
            TokenType::LET,
            TokenType::IDENT,
            TokenType::ASSIGN,
            TokenType::INT,
            TokenType::SEMICOLON,
        ]);
        assert_eq!(Lexer::new("   ").count(), 0);
    }

    #[test]
    fn test_illegal_and_unicode() {
        let toks: Vec<_> = Lexer::new("a @ é \"ü").collect();
        assert_eq!(toks.len(), 4);
        assert_eq!(toks[1].token_type, TokenType::ILLEGAL);
        assert_eq!(toks[1].literal, "@");
        assert_eq!(toks[2].token_type, TokenType::ILLEGAL);
        assert_eq!(toks[2].literal, "é");
        // unterminated string runs to the end of the line
        assert_eq!(toks[3].token_type, TokenType::STRING);
        assert_eq!(toks[3].literal, "ü");
    }
}
