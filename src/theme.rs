use nu_ansi_term::{Color, Style};

/// Colors used when reporting errors on a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colors {
    /// Category labels such as "Parse error" and "Runtime error".
    pub error: Color,
    /// The `^` marker under the offending instruction.
    pub caret: Color,
    /// Program name prefix.
    pub program: Color,
}

impl Default for Colors {
    fn default() -> Self {
        // Catppuccin Mocha accents
        Self {
            error: Color::Rgb(243, 139, 168),
            caret: Color::Rgb(249, 226, 175),
            program: Color::Rgb(108, 112, 134),
        }
    }
}

impl Colors {
    pub fn error_style(&self) -> Style {
        self.error.bold()
    }

    pub fn caret_style(&self) -> Style {
        self.caret.bold()
    }

    pub fn program_style(&self) -> Style {
        Style::new().fg(self.program)
    }
}

/// Parse `#RRGGBB` or a named ANSI color.
pub fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }

    let name = s.to_ascii_lowercase();
    Some(match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Purple,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "light_gray" => Color::LightGray,
        "darkgray" | "dark_gray" | "darkgrey" | "dark_grey" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightyellow" | "light_yellow" => Color::LightYellow,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightmagenta" | "light_magenta" => Color::LightPurple,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color(" #FF8000 "), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(parse_color("#ff80"), None);
        assert_eq!(parse_color("#gg8000"), None);
    }

    #[test]
    fn parses_named_colors_case_insensitively() {
        assert_eq!(parse_color("Red"), Some(Color::Red));
        assert_eq!(parse_color("light_blue"), Some(Color::LightBlue));
        assert_eq!(parse_color("magenta"), Some(Color::Purple));
        assert_eq!(parse_color("chartreuse"), None);
    }
}
