//! Link words.

/// One word on a link: a value of the configured width plus a header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    pub data: u64,
    pub is_header: bool,
}

impl Word {
    #[inline]
    pub const fn header(data: u64) -> Self {
        Self {
            data,
            is_header: true,
        }
    }

    #[inline]
    pub const fn payload(data: u64) -> Self {
        Self {
            data,
            is_header: false,
        }
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = if self.is_header { "H" } else { "P" };
        write!(f, "{}:{:#x}", tag, self.data)
    }
}
