//! Best-effort conversion of `$regex` patterns into wildcard patterns.
//!
//! Dialects without a native regular-expression predicate emulate `$regex`
//! with LIKE or, on SQLite, GLOB. The mapping is lossy:
//!
//! | regex          | LIKE          | GLOB          |
//! |----------------|---------------|---------------|
//! | `^` / `$`      | anchor        | anchor        |
//! | unanchored end | `%`           | `*`           |
//! | `.*`           | `%`           | `*`           |
//! | `.+`           | `_%`          | `?*`          |
//! | `.`            | `_`           | `?`           |
//! | `\x`           | literal `x`   | literal `x`   |
//! | metacharacter  | `\%` `\_` `\\` | `[*]` `[?]` `[[]` |
//!
//! T-SQL LIKE also treats `[` as a class opener, so [`PatternSyntax::TransactSqlLike`]
//! escapes it as `\[`.
//!
//! Case sensitivity is the dialect's concern: SQLite LIKE ignores ASCII case
//! and GLOB does not, and SQL Server follows the column collation unless a
//! `COLLATE` clause overrides it.
//!
//! Character classes, alternation, groups and counted repetition are not
//! emulated; their characters are matched literally.

use crate::error::{QueryError, QueryResult};

/// Escape character used in generated LIKE patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Flags accepted in `$options`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexOptions {
    /// `i`: case-insensitive matching.
    pub case_insensitive: bool,
}

impl RegexOptions {
    /// Parse a MongoDB-style option string.
    ///
    /// `i` is honoured; `m`, `s` and `x` are accepted and ignored.
    pub fn parse(field: &str, options: &str) -> QueryResult<Self> {
        let mut parsed = Self::default();
        for flag in options.chars() {
            match flag {
                'i' => parsed.case_insensitive = true,
                'm' | 's' | 'x' => {}
                other => {
                    return Err(QueryError::invalid_value(
                        "$options",
                        field,
                        format!("unsupported regex option '{}'", other),
                    ));
                }
            }
        }
        Ok(parsed)
    }
}

/// Wildcard pattern language an emulated `$regex` is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntax {
    /// Standard LIKE with `\` as the escape character.
    Like,
    /// SQL Server LIKE, where `[` opens a character class.
    TransactSqlLike,
    /// SQLite GLOB: case-sensitive, no escape character.
    Glob,
}

impl PatternSyntax {
    /// Convert a regular expression into an equivalent-where-possible pattern.
    pub fn convert(self, pattern: &str) -> String {
        let (body, anchored_start) = match pattern.strip_prefix('^') {
            Some(rest) => (rest, true),
            None => (pattern, false),
        };
        let (body, anchored_end) = match body.strip_suffix('$') {
            Some(rest) if !ends_with_escape(rest) => (rest, true),
            _ => (body, false),
        };

        let mut out = PatternWriter::new(self, body.len() + 2);
        if !anchored_start {
            out.any_run();
        }

        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.literal(chars.next().unwrap_or('\\')),
                '.' => match chars.peek() {
                    Some('*') => {
                        chars.next();
                        out.any_run();
                    }
                    Some('+') => {
                        chars.next();
                        out.any_one();
                        out.any_run();
                    }
                    _ => out.any_one(),
                },
                other => out.literal(other),
            }
        }

        if !anchored_end {
            out.any_run();
        }

        out.finish()
    }
}

/// Convert a regular expression into a LIKE pattern escaped with `\`.
pub fn regex_to_like(pattern: &str) -> String {
    PatternSyntax::Like.convert(pattern)
}

/// Convert a regular expression into a case-sensitive SQLite GLOB pattern.
pub fn regex_to_glob(pattern: &str) -> String {
    PatternSyntax::Glob.convert(pattern)
}

struct PatternWriter {
    syntax: PatternSyntax,
    out: String,
    open_run: bool,
}

impl PatternWriter {
    fn new(syntax: PatternSyntax, capacity: usize) -> Self {
        Self {
            syntax,
            out: String::with_capacity(capacity),
            open_run: false,
        }
    }

    fn any_run(&mut self) {
        if !self.open_run {
            self.out.push(match self.syntax {
                PatternSyntax::Glob => '*',
                _ => '%',
            });
            self.open_run = true;
        }
    }

    fn any_one(&mut self) {
        self.out.push(match self.syntax {
            PatternSyntax::Glob => '?',
            _ => '_',
        });
        self.open_run = false;
    }

    fn literal(&mut self, c: char) {
        match self.syntax {
            PatternSyntax::Like if matches!(c, '%' | '_' | LIKE_ESCAPE) => {
                self.out.push(LIKE_ESCAPE);
                self.out.push(c);
            }
            PatternSyntax::TransactSqlLike if matches!(c, '%' | '_' | '[' | LIKE_ESCAPE) => {
                self.out.push(LIKE_ESCAPE);
                self.out.push(c);
            }
            PatternSyntax::Glob if matches!(c, '*' | '?' | '[') => {
                self.out.push('[');
                self.out.push(c);
                self.out.push(']');
            }
            _ => self.out.push(c),
        }
        self.open_run = false;
    }

    fn finish(self) -> String {
        self.out
    }
}

fn ends_with_escape(s: &str) -> bool {
    s.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}
