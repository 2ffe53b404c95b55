//! Glob to regex translation
//!
//! Glob strings in a `test` option are translated to anchored regular
//! expressions once, when the matcher is compiled. The supported syntax is the
//! subset of minimatch that build tools use for asset names:
//!
//! - `*` matches any run of characters except `/`
//! - `?` matches exactly one character except `/`
//! - `**` as a whole path segment matches zero or more segments
//! - `[abc]`, `[a-z]`, `[!abc]` / `[^abc]` character classes
//! - `{png,jpg}` alternation (nestable, alternatives may contain globs)
//! - `{1..3}` numeric ranges
//! - `\x` escapes the next character
//! - a leading `!` negates the whole pattern
//!
//! A pattern that contains no `/` is matched against the basename, so
//! `*.png` matches both `a.png` and `img/a.png`.

/// A glob translated to regex syntax
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Anchored regex source
    pub regex: String,
    /// Whether the glob was negated with a leading `!`
    pub negated: bool,
}

/// Translate a glob into an anchored regex source.
pub fn translate(glob: &str) -> Translation {
    let bangs = glob.chars().take_while(|&c| c == '!').count();
    let body = &glob[bangs..];
    let chars: Vec<char> = body.chars().collect();

    let inner = translate_chars(&chars, true, true);
    let regex = if body.contains('/') {
        format!("^{inner}$")
    } else {
        format!("^(?:.*/)?{inner}$")
    };

    Translation {
        regex,
        negated: bangs % 2 == 1,
    }
}

/// Translate a slice of glob characters.
///
/// `opens_segment` and `closes_segment` tell whether the slice starts right
/// after a `/` (or the pattern start) and ends right before one (or the
/// pattern end); brace alternatives inherit them from their braces.
fn translate_chars(chars: &[char], opens_segment: bool, closes_segment: bool) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' => {
                match chars.get(i + 1) {
                    Some(next) => push_literal(&mut out, *next),
                    None => out.push_str(r"\\"),
                }
                i += 2;
            }
            '*' => {
                let run = chars[i..].iter().take_while(|&&c| c == '*').count();
                let at_start = if i == 0 {
                    opens_segment
                } else {
                    chars[i - 1] == '/'
                };
                let next = chars.get(i + run);
                let at_end = next.map_or(closes_segment, |&c| c == '/');

                if run >= 2 && at_start && at_end {
                    if next == Some(&'/') {
                        out.push_str("(?:.*/)?");
                        i += run + 1;
                    } else {
                        out.push_str(".*");
                        i += run;
                    }
                } else {
                    out.push_str("[^/]*");
                    i += run;
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => match class_end(chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    push_literal(&mut out, '[');
                    i += 1;
                }
            },
            '{' => match brace_end(chars, i) {
                Some(end) => {
                    let at_start = if i == 0 {
                        opens_segment
                    } else {
                        chars[i - 1] == '/'
                    };
                    let at_end = chars.get(end + 1).map_or(closes_segment, |&c| c == '/');
                    match translate_braces(&chars[i + 1..end], at_start, at_end) {
                        Some(group) => out.push_str(&group),
                        None => {
                            for &c in &chars[i..=end] {
                                push_literal(&mut out, c);
                            }
                        }
                    }
                    i = end + 1;
                }
                None => {
                    push_literal(&mut out, '{');
                    i += 1;
                }
            },
            c => {
                push_literal(&mut out, c);
                i += 1;
            }
        }
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Index of the `]` closing the class opened at `open`.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    // a `]` right after the opener is literal
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.first() {
        Some('!' | '^') => (true, &body[1..]),
        _ => (false, body),
    };

    let mut out = String::from("[");
    if negated {
        out.push_str("^/");
    }

    let mut i = 0;
    while i < body.len() {
        let (c, escaped) = match body[i] {
            '\\' if i + 1 < body.len() => {
                i += 1;
                (body[i], true)
            }
            c => (c, false),
        };
        // an escaped dash, or one at either edge, is literal
        let literal_dash = c == '-' && (escaped || i == 0 || i + 1 == body.len());
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(c);
            }
            '-' if literal_dash => out.push_str(r"\-"),
            _ => out.push(c),
        }
        i += 1;
    }

    out.push(']');
    out
}

/// Index of the `}` closing the brace opened at `open`, skipping nested
/// braces, classes, and escapes.
fn brace_end(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut j = open;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 1,
            '[' => {
                if let Some(end) = class_end(chars, j) {
                    j = end;
                }
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Translate the inside of a `{...}` group, or `None` when it is not an
/// alternation (no top-level comma and no numeric range).
fn translate_braces(body: &[char], at_start: bool, at_end: bool) -> Option<String> {
    let alternatives = split_alternatives(body);
    if alternatives.len() < 2 {
        return numeric_range(body);
    }

    let translated: Vec<String> = alternatives
        .iter()
        .map(|alt| translate_chars(alt, at_start, at_end))
        .collect();
    Some(format!("(?:{})", translated.join("|")))
}

fn split_alternatives(body: &[char]) -> Vec<&[char]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut j = 0;
    while j < body.len() {
        match body[j] {
            '\\' => j += 1,
            '[' => {
                if let Some(end) = class_end(body, j) {
                    j = end;
                }
            }
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..j]);
                start = j + 1;
            }
            _ => {}
        }
        j += 1;
    }
    parts.push(&body[start..]);
    parts
}

fn numeric_range(body: &[char]) -> Option<String> {
    let text: String = body.iter().collect();
    let (lo, hi) = text.split_once("..")?;
    let lo: i64 = lo.parse().ok()?;
    let hi: i64 = hi.parse().ok()?;
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

    let values: Vec<String> = (lo..=hi).map(|n| n.to_string()).collect();
    Some(format!("(?:{})", values.join("|")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use rstest::rstest;

    fn matches(glob: &str, name: &str) -> bool {
        let t = translate(glob);
        Regex::new(&t.regex).unwrap().is_match(name) != t.negated
    }

    #[test]
    fn test_basename_pattern_is_unanchored_on_directories() {
        let t = translate("*.png");
        assert_eq!(t.regex, r"^(?:.*/)?[^/]*\.png$");
        assert!(!t.negated);
    }

    #[rstest]
    #[case("*.png", "a.png", true)]
    #[case("*.png", "dir/b.png", true)]
    #[case("*.png", "a.jpg", false)]
    #[case("*.png", "a.png.map", false)]
    #[case("img/*.png", "img/a.png", true)]
    #[case("img/*.png", "img/sub/a.png", false)]
    #[case("img/*.png", "other/img/a.png", false)]
    #[case("**/*.png", "a.png", true)]
    #[case("**/*.png", "x/y/z.png", true)]
    #[case("img/**/*.svg", "img/a.svg", true)]
    #[case("img/**/*.svg", "img/a/b/c.svg", true)]
    #[case("img/**", "img/a/b", true)]
    #[case("a**b", "axxb", true)]
    #[case("a**b", "ax/xb", false)]
    #[case("?.gif", "a.gif", true)]
    #[case("?.gif", "ab.gif", false)]
    #[case("[ab].jpg", "a.jpg", true)]
    #[case("[ab].jpg", "c.jpg", false)]
    #[case("[a-c].jpg", "b.jpg", true)]
    #[case("[!a].jpg", "b.jpg", true)]
    #[case("[!a].jpg", "a.jpg", false)]
    #[case("[^a].jpg", "a.jpg", false)]
    #[case("[!-a].jpg", "b.jpg", true)]
    #[case("[!-a].jpg", "-.jpg", false)]
    #[case("[a-].jpg", "-.jpg", true)]
    #[case(r"[a\-c].jpg", "b.jpg", false)]
    #[case(r"[a\-c].jpg", "-.jpg", true)]
    #[case("*.{png,jpg}", "a.jpg", true)]
    #[case("*.{png,jpg}", "a.gif", false)]
    #[case("*.{png,{jpg,jpeg}}", "a.jpeg", true)]
    #[case("{img/**/*,*}.webp", "img/x/y.webp", true)]
    #[case("icon-{1..3}.png", "icon-2.png", true)]
    #[case("icon-{1..3}.png", "icon-4.png", false)]
    #[case("{png}", "{png}", true)]
    #[case("a[b", "a[b", true)]
    #[case("a{b", "a{b", true)]
    #[case(r"\*.png", "*.png", true)]
    #[case(r"\*.png", "a.png", false)]
    #[case("!*.png", "a.jpg", true)]
    #[case("!*.png", "a.png", false)]
    #[case("!!*.png", "a.png", true)]
    #[case("file+(1).png", "file+(1).png", true)]
    fn test_glob_matching(#[case] glob: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(matches(glob, name), expected, "{glob} vs {name}");
    }

    #[test]
    fn test_negated_class_does_not_cross_directories() {
        assert!(!matches("a[!x]b", "a/b"));
    }

    #[test]
    fn test_reversed_numeric_range() {
        assert!(matches("v{3..1}.png", "v2.png"));
    }
}
