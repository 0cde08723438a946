//! Syntactic parameter and argument counting for signature changes

use regex::Regex;

/// Arity of a parameter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub required: usize,
    pub total: usize,
    /// Ends in a `...rest` parameter.
    pub variadic: bool,
}

impl Arity {
    pub fn accepts(&self, args: usize) -> bool {
        args >= self.required && (self.variadic || args <= self.total)
    }
}

/// Parse `(a: string, b?: number, c = 1, ...rest)`, with or without a leading
/// name or `function` keyword. A string without parentheses is read as the bare list.
pub fn parse_params(signature: &str) -> Arity {
    let signature = signature.trim();
    // `name(`, `function name(` or a bare `(`; anything else is already the list
    let wrapped = signature.find('(').filter(|&open| {
        signature[..open]
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c.is_whitespace())
    });
    let inner = match wrapped {
        Some(open) => matching_close(signature, open)
            .map(|close| &signature[open + 1..close])
            .unwrap_or(&signature[open + 1..]),
        None => signature,
    };

    let mut arity = Arity {
        required: 0,
        total: 0,
        variadic: false,
    };
    for param in split_top_level(inner, true) {
        if param.starts_with("...") {
            arity.variadic = true;
            continue;
        }
        let name_part = param.split(':').next().unwrap_or(param);
        let optional = name_part.trim_end().ends_with('?') || has_top_level_default(param);
        arity.total += 1;
        if !optional {
            arity.required += 1;
        }
    }
    arity
}

/// A single-line call site `name(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// `name(arg, ...)` exactly as written.
    pub text: String,
    pub args: Vec<String>,
}

impl CallSite {
    /// The same call with only the first `keep` arguments.
    pub fn truncated(&self, name: &str, keep: usize) -> String {
        format!("{}({})", name, self.args[..keep.min(self.args.len())].join(", "))
    }
}

/// Call sites of `name` on one line whose argument list closes on the same line.
pub fn call_sites(line: &str, name: &str) -> Vec<CallSite> {
    let Ok(pattern) = Regex::new(&format!(r"(?:^|[^\w$.]){}\s*\(", regex::escape(name))) else {
        return Vec::new();
    };
    let mut sites = Vec::new();
    let mut from = 0;
    while let Some(m) = pattern.find_at(line, from) {
        from = m.end();
        let Some(start) = line[m.start()..m.end()].find(name).map(|o| m.start() + o) else {
            continue;
        };
        if line[..start].trim_end().ends_with("function") {
            continue;
        }
        let open = m.end() - 1;
        let Some(close) = matching_close(line, open) else {
            continue;
        };
        sites.push(CallSite {
            text: line[start..=close].to_string(),
            args: split_top_level(&line[open + 1..close], false)
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
    }
    sites
}

/// Index of the `)` matching the `(` at `open`, skipping nested brackets and strings.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return (c == ')').then_some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas not nested in brackets or strings, and in type
/// position not nested in generics either. Empty pieces are dropped.
fn split_top_level(list: &str, generics: bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    let mut prev = ' ';
    for (i, c) in list.char_indices() {
        let before = prev;
        prev = c;
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '<' if generics => depth += 1,
            '>' if generics && before != '=' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(list[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// `x = 1` or `x: number = 1`, but not `cb: () => void`.
fn has_top_level_default(param: &str) -> bool {
    let chars: Vec<char> = param.chars().collect();
    let mut depth = 0i32;
    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { chars[i - 1] } else { ' ' };
        let next = chars.get(i + 1).copied().unwrap_or(' ');
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '>' if prev != '=' => depth -= 1,
            '=' if depth == 0 && !matches!(prev, '=' | '!' | '<' | '>') && !matches!(next, '=' | '>') => {
                return true
            }
            _ => {}
        }
    }
    false
}
