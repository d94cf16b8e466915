//! Control Parser (C4): turns a flat [`crate::splitter::Token`] sequence into
//! the [`crate::ast::Command`] tree, recognizing `if`/`for`/`while` as
//! reserved words in command position and `;`/`&&`/`\|\|`/`\|` as the
//! chaining operators of §4.4.
//!
//! Grammar, low to high precedence:
//! `program := statement (';' statement)*`
//! `statement := pipeline (('&&' | '||') pipeline)* '&'?`
//! `pipeline := unit ('|' unit)*`
//! `unit := if-stmt | for-stmt | while-stmt | simple-command`
//!
//! Variable, alias, and wildcard expansion are deliberately NOT performed
//! here: a `Command::Simple`'s `words` are the Splitter's raw tokens, and the
//! Dispatcher expands them fresh every time the node runs, which is what
//! makes `for i in 1 2 3; do echo $i; done` see a different `$i` on each
//! pass through the same parsed body.

use crate::ast::{Command, Connector, Redirect, RedirectOp, Redirectee};
use crate::errors::{ShellError, ShellResult};
use crate::splitter::Token;

const RESERVED: &[&str] = &["then", "else", "elif", "fi", "do", "done"];

/// Parses one fully assembled logical input (already through the Splitter)
/// into a single [`Command`], chaining top-level `;`-separated statements
/// with [`Connector::Semicolon`].
pub fn parse_chain(tokens: Vec<Token>) -> ShellResult<Command> {
    let statements = parse(tokens)?;
    Ok(statements
        .into_iter()
        .reduce(|acc, next| Command::Connection {
            first: Box::new(acc),
            second: Box::new(next),
            connector: Connector::Semicolon,
        })
        .unwrap_or_else(Command::noop))
}

/// Parses one fully assembled logical input into the top-level sequence of
/// independent statements (§4.4's "segmented by `;`").
pub fn parse(tokens: Vec<Token>) -> ShellResult<Vec<Command>> {
    let mut parser = Parser { tokens, pos: 0 };
    let statements = parser.parse_statement_list(&[])?;
    if !parser.at_end() {
        return Err(ShellError::Syntax(format!(
            "unexpected token: {}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(statements)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token::Word(w)) => Some(w.as_str()),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_word(&mut self, expected: &str) -> ShellResult<()> {
        match self.advance() {
            Some(Token::Word(w)) if w == expected => Ok(()),
            Some(other) => Err(ShellError::Syntax(format!(
                "expected `{expected}`, found `{other}`"
            ))),
            None => Err(ShellError::Syntax("unexpected end of file".to_string())),
        }
    }

    /// Consumes a `Word` token that must not be empty -- used for a `for`
    /// loop's variable name.
    fn expect_name(&mut self) -> ShellResult<String> {
        match self.advance() {
            Some(Token::Word(w)) => Ok(w),
            _ => Err(ShellError::Syntax("expected a name".to_string())),
        }
    }

    fn skip_semicolons(&mut self) {
        while matches!(self.peek(), Some(Token::Semi)) {
            self.advance();
        }
    }

    fn parse_statement_list(&mut self, stops: &[&str]) -> ShellResult<Vec<Command>> {
        let mut statements = Vec::new();
        loop {
            self.skip_semicolons();
            if self.at_end() {
                break;
            }
            if let Some(w) = self.peek_word() {
                if stops.contains(&w) {
                    break;
                }
            }
            let Some(statement) = self.parse_statement(stops)? else {
                break;
            };
            statements.push(statement);
            if !matches!(self.peek(), Some(Token::Semi)) {
                break;
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self, stops: &[&str]) -> ShellResult<Option<Command>> {
        let Some(mut left) = self.parse_pipeline(stops)? else {
            return Ok(None);
        };

        loop {
            match self.peek() {
                Some(Token::AndAnd) => {
                    self.advance();
                    let right = self.require_pipeline(stops, "&&")?;
                    left = Command::Connection {
                        first: Box::new(left),
                        second: Box::new(right),
                        connector: Connector::And,
                    };
                }
                Some(Token::OrOr) => {
                    self.advance();
                    let right = self.require_pipeline(stops, "||")?;
                    left = Command::Connection {
                        first: Box::new(left),
                        second: Box::new(right),
                        connector: Connector::Or,
                    };
                }
                _ => break,
            }
        }

        if matches!(self.peek(), Some(Token::Ampersand)) {
            self.advance();
            mark_background(&mut left);
        }

        Ok(Some(left))
    }

    fn require_pipeline(&mut self, stops: &[&str], after: &str) -> ShellResult<Command> {
        self.parse_pipeline(stops)?
            .ok_or_else(|| ShellError::Syntax(format!("expected a command after `{after}`")))
    }

    fn parse_pipeline(&mut self, stops: &[&str]) -> ShellResult<Option<Command>> {
        let Some(mut left) = self.parse_unit(stops)? else {
            return Ok(None);
        };
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.advance();
            let right = self
                .parse_unit(stops)?
                .ok_or_else(|| ShellError::Syntax("expected a command after `|`".to_string()))?;
            left = Command::Connection {
                first: Box::new(left),
                second: Box::new(right),
                connector: Connector::Pipe,
            };
        }
        Ok(Some(left))
    }

    fn parse_unit(&mut self, stops: &[&str]) -> ShellResult<Option<Command>> {
        match self.peek_word() {
            Some("if") => {
                self.advance();
                Ok(Some(self.parse_if_tail()?))
            }
            Some("for") => {
                self.advance();
                Ok(Some(self.parse_for_tail()?))
            }
            Some("while") => {
                self.advance();
                Ok(Some(self.parse_while_tail()?))
            }
            Some(w) if stops.contains(&w) || RESERVED.contains(&w) => Ok(None),
            _ => self.parse_simple(),
        }
    }

    /// Parses `COND [;] then BODY (else BODY | elif ...)? fi`, with `if`
    /// already consumed. `elif` recurses into this same function, since the
    /// remainder of an `elif` clause has an identical shape to a fresh `if`.
    fn parse_if_tail(&mut self) -> ShellResult<Command> {
        let condition = self
            .parse_statement(&["then"])?
            .ok_or_else(|| ShellError::Syntax("expected a condition after `if`".to_string()))?;
        self.skip_semicolons();
        self.expect_word("then")?;
        let then_branch = self.parse_statement_list(&["else", "elif", "fi"])?;

        let else_branch = match self.peek_word() {
            Some("else") => {
                self.advance();
                let body = self.parse_statement_list(&["fi"])?;
                self.expect_word("fi")?;
                Some(body)
            }
            Some("elif") => {
                self.advance();
                Some(vec![self.parse_if_tail()?])
            }
            Some("fi") => {
                self.advance();
                None
            }
            _ => return Err(ShellError::Syntax("unexpected end of file".to_string())),
        };

        Ok(Command::If {
            condition: Box::new(condition),
            then_branch,
            else_branch,
        })
    }

    /// Parses `VAR in W1 W2 ... [;] do BODY done`, with `for` already
    /// consumed.
    fn parse_for_tail(&mut self) -> ShellResult<Command> {
        let variable = self.expect_name()?;
        self.expect_word("in")?;
        let mut words = Vec::new();
        while let Some(Token::Word(w)) = self.peek() {
            words.push(w.clone());
            self.advance();
        }
        self.skip_semicolons();
        self.expect_word("do")?;
        let body = self.parse_statement_list(&["done"])?;
        self.expect_word("done")?;
        Ok(Command::For {
            variable,
            words,
            body,
        })
    }

    /// Parses `COND [;] do BODY done`, with `while` already consumed.
    fn parse_while_tail(&mut self) -> ShellResult<Command> {
        let condition = self
            .parse_statement(&["do"])?
            .ok_or_else(|| ShellError::Syntax("expected a condition after `while`".to_string()))?;
        self.skip_semicolons();
        self.expect_word("do")?;
        let body = self.parse_statement_list(&["done"])?;
        self.expect_word("done")?;
        Ok(Command::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_simple(&mut self) -> ShellResult<Option<Command>> {
        let mut words = Vec::new();
        let mut redirects = Vec::new();

        loop {
            match self.peek() {
                None
                | Some(Token::Semi)
                | Some(Token::Pipe)
                | Some(Token::AndAnd)
                | Some(Token::OrOr)
                | Some(Token::Ampersand) => break,
                Some(Token::Word(w)) if words.is_empty() && RESERVED.contains(&w.as_str()) => {
                    break
                }
                Some(Token::Word(w)) => {
                    words.push(w.clone());
                    self.advance();
                }
                Some(op) => {
                    let redirect_op = redirect_op_for(op);
                    self.advance();
                    let target = match self.advance() {
                        Some(Token::Word(w)) => w,
                        _ => {
                            return Err(ShellError::Syntax(
                                "expected a filename after redirection operator".to_string(),
                            ))
                        }
                    };
                    redirects.push(Redirect {
                        op: redirect_op,
                        target: Redirectee::Filename(target),
                    });
                }
            }
        }

        if words.is_empty() && redirects.is_empty() {
            return Ok(None);
        }

        Ok(Some(Command::Simple {
            words,
            redirects,
            background: false,
        }))
    }
}

fn redirect_op_for(token: &Token) -> RedirectOp {
    match token {
        Token::RedirectIn => RedirectOp::In,
        Token::RedirectOut => RedirectOp::Out,
        Token::RedirectAppend => RedirectOp::Append,
        Token::RedirectErrOut => RedirectOp::ErrOut,
        Token::RedirectErrAppend => RedirectOp::ErrAppend,
        Token::RedirectBoth => RedirectOp::Both,
        Token::HereDoc => RedirectOp::HereDoc,
        _ => unreachable!("redirect_op_for called with a non-redirect token"),
    }
}

fn mark_background(command: &mut Command) {
    match command {
        Command::Simple { background, .. } => *background = true,
        Command::Connection { second, .. } => mark_background(second),
        Command::If { .. } | Command::For { .. } | Command::While { .. } => {}
    }
}

/// Recognizes whether a freshly read interactive line opens a multiline
/// block, for the Line Reader's "Multiline collection" behavior (§4.4).
pub fn opens_block(line: &str) -> bool {
    matches!(first_word(line), Some("if") | Some("for") | Some("while"))
}

/// Net nesting-depth change a line contributes to multiline collection:
/// `if`/`for`/`while` open a level, `fi`/`done` close one. Used by the
/// reader to know when a block is complete without running the full parser.
pub fn depth_delta(line: &str) -> i32 {
    let mut delta = 0;
    for word in line.split_whitespace() {
        match word {
            "if" | "for" | "while" => delta += 1,
            "fi" | "done" => delta -= 1,
            _ => {}
        }
    }
    delta
}

fn first_word(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitter::split;

    fn parse_line(line: &str) -> Command {
        parse_chain(split(line).unwrap()).unwrap()
    }

    #[test]
    fn parses_simple_command() {
        let cmd = parse_line("echo a b");
        assert_eq!(
            cmd,
            Command::Simple {
                words: vec!["echo".into(), "a".into(), "b".into()],
                redirects: vec![],
                background: false,
            }
        );
    }

    #[test]
    fn parses_pipeline_left_associatively() {
        let cmd = parse_line("a | b | c");
        match cmd {
            Command::Connection { connector: Connector::Pipe, first, second } => {
                assert!(matches!(*second, Command::Simple { .. }));
                assert!(matches!(*first, Command::Connection { connector: Connector::Pipe, .. }));
            }
            other => panic!("expected a pipe connection, got {other:?}"),
        }
    }

    #[test]
    fn short_circuit_operators_bind_looser_than_pipe() {
        let cmd = parse_line("a | b && c");
        match cmd {
            Command::Connection { connector: Connector::And, first, .. } => {
                assert!(matches!(*first, Command::Connection { connector: Connector::Pipe, .. }));
            }
            other => panic!("expected an && at the top, got {other:?}"),
        }
    }

    #[test]
    fn trailing_ampersand_marks_background() {
        let cmd = parse_line("sleep 1 &");
        assert!(cmd.is_background());
    }

    #[test]
    fn parses_redirections() {
        let cmd = parse_line("cmd > out.txt 2>> err.txt");
        match cmd {
            Command::Simple { words, redirects, .. } => {
                assert_eq!(words, vec!["cmd".to_string()]);
                assert_eq!(redirects.len(), 2);
                assert_eq!(redirects[0].op, RedirectOp::Out);
                assert_eq!(redirects[1].op, RedirectOp::ErrAppend);
            }
            other => panic!("expected a simple command, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_else() {
        let tokens = split("if true; then echo a; else echo b; fi").unwrap();
        let cmd = parse_chain(tokens).unwrap();
        match cmd {
            Command::If { then_branch, else_branch, .. } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.unwrap().len(), 1);
            }
            other => panic!("expected an if, got {other:?}"),
        }
    }

    #[test]
    fn parses_elif_chain() {
        let tokens = split("if a; then b; elif c; then d; else e; fi").unwrap();
        let cmd = parse_chain(tokens).unwrap();
        match cmd {
            Command::If { else_branch: Some(branch), .. } => match &branch[0] {
                Command::If { .. } => {}
                other => panic!("expected elif to desugar to a nested if, got {other:?}"),
            },
            other => panic!("expected an if, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_loop() {
        let tokens = split("for i in 1 2 3; do echo $i; done").unwrap();
        let cmd = parse_chain(tokens).unwrap();
        match cmd {
            Command::For { variable, words, body } => {
                assert_eq!(variable, "i");
                assert_eq!(words, vec!["1".to_string(), "2".to_string(), "3".to_string()]);
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected a for loop, got {other:?}"),
        }
    }

    #[test]
    fn parses_while_loop() {
        let tokens = split("while true; do echo x; done").unwrap();
        let cmd = parse_chain(tokens).unwrap();
        assert!(matches!(cmd, Command::While { .. }));
    }

    #[test]
    fn unterminated_if_is_a_syntax_error() {
        let tokens = split("if true; then echo a").unwrap();
        assert!(parse_chain(tokens).is_err());
    }

    #[test]
    fn semicolon_separated_statements_chain() {
        let tokens = split("echo a; echo b; echo c").unwrap();
        let cmd = parse_chain(tokens).unwrap();
        match cmd {
            Command::Connection { connector: Connector::Semicolon, .. } => {}
            other => panic!("expected a semicolon chain, got {other:?}"),
        }
    }
}
