//! Symbol table for the Hack assembler
//!
//! Predefined symbols (registers, I/O pointers) live in a compile-time PHF map
//! for O(1) lookup. User-defined symbols (labels and variables) are resolved
//! at assembly time and stored in a growable `HashMap`, with variables
//! allocated starting at RAM address 16 as they are first referenced.

use std::collections::HashMap;

use phf::phf_map;

/// First free RAM address for variable allocation (0-15 are reserved for R0-R15).
pub const VARIABLE_BASE_ADDRESS: u16 = 16;

static PREDEFINED_SYMBOLS: phf::Map<&'static str, u16> = phf_map! {
    "R0" => 0,
    "R1" => 1,
    "R2" => 2,
    "R3" => 3,
    "R4" => 4,
    "R5" => 5,
    "R6" => 6,
    "R7" => 7,
    "R8" => 8,
    "R9" => 9,
    "R10" => 10,
    "R11" => 11,
    "R12" => 12,
    "R13" => 13,
    "R14" => 14,
    "R15" => 15,
    "SP" => 0,
    "LCL" => 1,
    "ARG" => 2,
    "THIS" => 3,
    "THAT" => 4,
    "SCREEN" => 16384,
    "KBD" => 24576,
};

/// Maps symbols (labels and variables) to RAM/ROM addresses.
///
/// Predefined symbols are checked first (PHF, O(1)); labels and variables
/// bound during assembly live in `user_symbols`.
pub struct SymbolTable {
    user_symbols: HashMap<String, u16>,
    next_variable_address: u16,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_symbols: HashMap::new(),
            next_variable_address: VARIABLE_BASE_ADDRESS,
        }
    }

    /// Binds a symbol (typically a label) to an explicit address.
    ///
    /// # Example
    /// ```
    /// use assembler::symbol_table::SymbolTable;
    /// let mut table = SymbolTable::new();
    /// table.add_entry("LOOP", 18);
    /// assert_eq!(table.get_address("LOOP"), Some(18));
    /// ```
    #[inline]
    pub fn add_entry(&mut self, symbol: &str, address: u16) {
        self.user_symbols.insert(symbol.to_string(), address);
    }

    /// True if `symbol` is known, either predefined or user-defined.
    #[inline]
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        PREDEFINED_SYMBOLS.contains_key(symbol) || self.user_symbols.contains_key(symbol)
    }

    /// Resolves a symbol's address, checking predefined symbols first.
    #[inline]
    #[must_use]
    pub fn get_address(&self, symbol: &str) -> Option<u16> {
        PREDEFINED_SYMBOLS
            .get(symbol)
            .copied()
            .or_else(|| self.user_symbols.get(symbol).copied())
    }

    /// Resolves `symbol`, allocating the next free variable address if it is
    /// not already known (predefined or previously bound as a label/variable).
    ///
    /// # Example
    /// ```
    /// use assembler::symbol_table::SymbolTable;
    /// let mut table = SymbolTable::new();
    /// assert_eq!(table.get_or_insert("foo"), 16);
    /// assert_eq!(table.get_or_insert("bar"), 17);
    /// assert_eq!(table.get_or_insert("foo"), 16);
    /// ```
    #[inline]
    pub fn get_or_insert(&mut self, symbol: &str) -> u16 {
        if let Some(address) = self.get_address(symbol) {
            return address;
        }

        let address = self.next_variable_address;
        self.user_symbols.insert(symbol.to_string(), address);
        self.next_variable_address += 1;
        address
    }

    #[inline]
    #[must_use]
    pub fn user_symbol_count(&self) -> usize {
        self.user_symbols.len()
    }

    #[inline]
    #[must_use]
    pub fn predefined_symbol_count(&self) -> usize {
        PREDEFINED_SYMBOLS.len()
    }
}
