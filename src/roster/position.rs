use super::types::{Person, PersonId, Role, Slot};

/// Decides which member of a pair takes the primary seat.
///
/// Faculty always outranks staff in a mixed pair. Within one population the
/// more senior member (lower rank) takes the primary seat. Re-applying this
/// to an already ordered slot is a no-op.
pub fn order_pair(people: &[Person], a: PersonId, b: PersonId) -> (PersonId, PersonId) {
    let pa = &people[a];
    let pb = &people[b];
    match (pa.role, pb.role) {
        (Role::Faculty, Role::Staff) => (a, b),
        (Role::Staff, Role::Faculty) => (b, a),
        _ if pa.rank <= pb.rank => (a, b),
        _ => (b, a),
    }
}

/// Re-applies the seat ordering rule to a slot.
pub fn resolve_slot(people: &[Person], slot: Slot) -> Slot {
    let (primary, secondary) = order_pair(people, slot.primary, slot.secondary);
    Slot { primary, secondary }
}
