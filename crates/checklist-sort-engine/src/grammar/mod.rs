//! Line grammar for checklist documents.
//!
//! A list item is `<indent><bullet><space>[<checkbox>]<text>` where the bullet
//! is one of `-`, `*`, `+` and the optional checkbox is `[ ]`, `[x]` or `[X]`.
//! Everything here is a pure function of one line's text.

/// Bullet characters that start a list item.
pub const BULLETS: [char; 3] = ['-', '*', '+'];

/// Bullet style of a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bullet {
    Dash,     // "-"
    Asterisk, // "*"
    Plus,     // "+"
}

impl Bullet {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Bullet::Dash),
            '*' => Some(Bullet::Asterisk),
            '+' => Some(Bullet::Plus),
            _ => None,
        }
    }
}

/// A checkbox token found right after a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkbox {
    pub checked: bool,
    /// Byte offset of the state character (the one between the brackets).
    pub state_offset: usize,
}

/// A line that matched the list-item grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLine<'a> {
    /// Leading whitespace characters; tabs and spaces count one each.
    pub depth: usize,
    pub bullet: Bullet,
    pub checkbox: Option<Checkbox>,
    /// Item text after the bullet and checkbox.
    pub text: &'a str,
}

impl<'a> ListLine<'a> {
    /// Parse a line as a list item, returning `None` for non-list content.
    pub fn parse(line: &'a str) -> Option<Self> {
        let rest = line.trim_start_matches(is_indent);
        let indent_bytes = line.len() - rest.len();

        let mut chars = rest.chars();
        let bullet = Bullet::from_char(chars.next()?)?;
        let after_bullet = chars.as_str();
        if !after_bullet.starts_with(' ') {
            return None;
        }

        let body = after_bullet.trim_start_matches(' ');
        // Bullets are ASCII, so one byte.
        let body_offset = indent_bytes + 1 + (after_bullet.len() - body.len());

        let (checkbox, text) = match parse_checkbox(body) {
            Some((checked, text)) => (
                Some(Checkbox {
                    checked,
                    state_offset: body_offset + 1,
                }),
                text,
            ),
            None => (None, body),
        };

        Some(ListLine {
            depth: line[..indent_bytes].chars().count(),
            bullet,
            checkbox,
            text,
        })
    }
}

fn is_indent(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Recognise `[ ]`, `[x]` or `[X]` at the start of `body`, followed by
/// whitespace or the end of the line.
fn parse_checkbox(body: &str) -> Option<(bool, &str)> {
    let checked = match body.get(..3)? {
        "[ ]" => false,
        "[x]" | "[X]" => true,
        _ => return None,
    };
    let rest = &body[3..];
    match rest.chars().next() {
        None => Some((checked, rest)),
        Some(c) if c.is_whitespace() => Some((checked, rest.trim_start_matches([' ', '\t']))),
        Some(_) => None,
    }
}

/// Count of leading whitespace characters. No tab-width normalization.
pub fn indent_depth(line: &str) -> usize {
    line.chars().take_while(|&c| is_indent(c)).count()
}

/// True when the line starts (after indentation) with a bullet and a space.
pub fn is_list_item(line: &str) -> bool {
    ListLine::parse(line).is_some()
}

/// True when the line is a list item carrying a checked checkbox.
pub fn is_checked(line: &str) -> bool {
    checkbox_state(line) == Some(true)
}

/// Checkbox state of a list item, or `None` when it has no checkbox.
pub fn checkbox_state(line: &str) -> Option<bool> {
    ListLine::parse(line)?.checkbox.map(|cb| cb.checked)
}

/// Flip the checkbox token of a list item, leaving every other byte untouched.
///
/// `[ ]` becomes `[x]`; `[x]` and `[X]` become `[ ]`. Returns `None` when the
/// line is not a list item or has no checkbox.
pub fn toggle_checkbox(line: &str) -> Option<String> {
    let checkbox = ListLine::parse(line)?.checkbox?;
    let replacement = if checkbox.checked { " " } else { "x" };

    let mut toggled = String::with_capacity(line.len());
    toggled.push_str(&line[..checkbox.state_offset]);
    toggled.push_str(replacement);
    toggled.push_str(&line[checkbox.state_offset + 1..]);
    Some(toggled)
}
