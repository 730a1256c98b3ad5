use std::collections::HashMap;

use crate::kernel::collab::Address;

/// Address -> symbol name, used to annotate trace records.
///
/// Built once from the program's name -> address table. When several names
/// share an address the lexicographically smallest wins, so lookups do not
/// depend on map iteration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolLookupTable {
    names: HashMap<Address, String>,
}

impl SymbolLookupTable {
    pub fn invert<'a, I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a Address)>,
    {
        let mut names: HashMap<Address, String> = HashMap::new();
        for (name, &addr) in symbols {
            match names.get(&addr) {
                Some(existing) if existing <= name => {}
                _ => {
                    names.insert(addr, name.clone());
                }
            }
        }
        Self { names }
    }

    /// Absent addresses are not an error; tracing stays best-effort.
    pub fn lookup(&self, addr: Address) -> Option<&str> {
        self.names.get(&addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
