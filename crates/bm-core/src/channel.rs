//! 5.1 channel layout
//!
//! The engine works on a fixed six-channel layout in film order:
//! L R C LFE Ls Rs.

/// Number of channels in the 5.1 layout
pub const NUM_CHANNELS: usize = 6;

/// Number of full-range (main) channels
pub const NUM_MAIN_CHANNELS: usize = 5;

/// 5.1 channel with its fixed buffer index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Channel {
    L = 0,
    R = 1,
    C = 2,
    Lfe = 3,
    Ls = 4,
    Rs = 5,
}

impl Channel {
    /// All channels in buffer order
    pub const ALL: [Channel; NUM_CHANNELS] = [
        Channel::L,
        Channel::R,
        Channel::C,
        Channel::Lfe,
        Channel::Ls,
        Channel::Rs,
    ];

    /// Full-range channels, in crossover processing order
    pub const MAIN: [Channel; NUM_MAIN_CHANNELS] = [
        Channel::L,
        Channel::R,
        Channel::C,
        Channel::Ls,
        Channel::Rs,
    ];

    /// Buffer index of this channel
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Channel at a buffer index, if inside the layout
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// True for the five full-range channels
    #[inline]
    pub const fn is_main(self) -> bool {
        !matches!(self, Channel::Lfe)
    }

    /// Short display name
    pub const fn name(self) -> &'static str {
        match self {
            Channel::L => "L",
            Channel::R => "R",
            Channel::C => "C",
            Channel::Lfe => "LFE",
            Channel::Ls => "Ls",
            Channel::Rs => "Rs",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}
