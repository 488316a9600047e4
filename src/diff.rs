use crate::style::{CaretStyle, StyleProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphClass {
    Correct,
    Error,
    /// A space in the target typed wrongly; drawn as an underlined blank.
    ErrorSpace,
    Pending,
}

/// One display directive per target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub class: GlyphClass,
    /// Set only on the cursor position, carrying the profile's caret style.
    pub caret: Option<CaretStyle>,
}

impl Glyph {
    pub fn is_caret(&self) -> bool {
        self.caret.is_some()
    }
}

/// Project the character-level diff of a session. Typed positions show what
/// was typed, the rest show the target.
pub fn project(
    target: &[char],
    typed: &[Option<char>],
    error_flags: &[bool],
    cursor: usize,
    style: &StyleProfile,
) -> Vec<Glyph> {
    target
        .iter()
        .zip(typed.iter().zip(error_flags))
        .enumerate()
        .map(|(idx, (&expected, (slot, &is_error)))| match slot {
            Some(actual) if idx < cursor => {
                let class = match (is_error, expected) {
                    (false, _) => GlyphClass::Correct,
                    (true, ' ') => GlyphClass::ErrorSpace,
                    (true, _) => GlyphClass::Error,
                };
                Glyph {
                    ch: if class == GlyphClass::ErrorSpace {
                        ' '
                    } else {
                        *actual
                    },
                    class,
                    caret: None,
                }
            }
            _ => Glyph {
                ch: expected,
                class: GlyphClass::Pending,
                caret: (idx == cursor).then_some(style.caret),
            },
        })
        .collect()
}
