/// Edge kind - the relations layered on the same call graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    // ============ Control Flow ============
    Call, // Caller → Callee ("may call"); root → every node

    // ============ Virtual Dispatch ============
    Overrides,    // Method → Method it directly overrides
    OverriddenBy, // Overridden method → Overrider
}

impl EdgeKind {
    pub fn is_call(&self) -> bool {
        matches!(self, EdgeKind::Call)
    }
}
