use bitflags::bitflags;

bitflags! {
    /// Access flags of a property.
    ///
    /// Only properties that are both readable and writable take part in
    /// serialization. `CONSTRUCT_ONLY` properties are supplied when the
    /// object is created and rejected by later writes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ParamFlags: u8 {
        /// The value can be read.
        const READABLE       = 1 << 0;
        /// The value can be written.
        const WRITABLE       = 1 << 1;
        /// The value can only be written while constructing.
        const CONSTRUCT_ONLY = 1 << 2;

        const READWRITE = Self::READABLE.bits() | Self::WRITABLE.bits();
    }
}

impl ParamFlags {
    /// Readable and writable, the properties a round trip can carry.
    #[inline]
    pub const fn is_readwrite(self) -> bool {
        self.contains(Self::READWRITE)
    }

    #[inline]
    pub const fn is_construct_only(self) -> bool {
        self.contains(Self::CONSTRUCT_ONLY)
    }
}
