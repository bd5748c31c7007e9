// Room inventory filtering
use crate::model::{Room, RoomFilters};

// Narrows a room collection by a RoomFilters query
pub struct InventoryFilter {}

impl Default for InventoryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryFilter {
    pub fn new() -> Self {
        Self {}
    }

    /// Keep the rooms matching every set filter, preserving input order.
    ///
    /// The `available` filter reads the room's `available` flag as given, so
    /// rooms should be annotated for the instant of interest first.
    pub fn apply(&self, rooms: &[Room], filters: &RoomFilters) -> Vec<Room> {
        rooms
            .iter()
            .filter(|room| self.matches(room, filters))
            .cloned()
            .collect()
    }

    pub fn matches(&self, room: &Room, filters: &RoomFilters) -> bool {
        if !filters.block.as_ref().map_or(true, |block| &room.block == block) {
            return false;
        }

        if !filters
            .capacity
            .map_or(true, |min| room.capacity >= min)
        {
            return false;
        }

        if !filters
            .resources
            .as_ref()
            .map_or(true, |ids| ids.iter().all(|id| room.has_resource(id)))
        {
            return false;
        }

        if !filters
            .query
            .as_ref()
            .filter(|query| !query.is_empty())
            .map_or(true, |query| {
                let query = query.to_lowercase();
                room.name.to_lowercase().contains(&query)
                    || room.block.to_lowercase().contains(&query)
            })
        {
            return false;
        }

        // Some(false) does not ask for occupied rooms
        if filters.available == Some(true) && !room.available {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::fixtures::room;
    use test_case::test_case;

    fn inventory() -> Vec<Room> {
        let mut rooms = vec![
            room("1", "Sala 101", "Bloco A", 40, &["1", "5"]),
            room("2", "Sala 102", "Bloco A", 30, &["1", "4", "5"]),
            room("3", "Sala 201", "Bloco B", 50, &["1", "3", "5"]),
            room("4", "Sala 202", "Bloco B", 25, &["1", "5"]),
            room("5", "Laboratório 1", "Bloco C", 35, &["1", "2", "5"]),
            room("6", "Auditório", "Bloco D", 120, &["1", "3", "4"]),
        ];
        rooms[1].available = false;
        rooms[4].available = false;
        rooms
    }

    #[test_case(RoomFilters { block: Some("Bloco A".to_string()), ..Default::default() },
        vec!["1", "2"]; "#1 Filter by block")]
    #[test_case(RoomFilters { block: Some("bloco a".to_string()), ..Default::default() },
        vec![]; "#2 Block match is case sensitive")]
    #[test_case(RoomFilters { capacity: Some(30), ..Default::default() },
        vec!["1", "2", "3", "5", "6"]; "#3 Capacity boundary is inclusive")]
    #[test_case(RoomFilters { resources: Some(vec!["1".to_string(), "4".to_string()]), ..Default::default() },
        vec!["2", "6"]; "#4 Rooms must hold every resource")]
    #[test_case(RoomFilters { resources: Some(vec![]), ..Default::default() },
        vec!["1", "2", "3", "4", "5", "6"]; "#5 Empty resource list is inert")]
    #[test_case(RoomFilters { query: Some("bloco a".to_string()), ..Default::default() },
        vec!["1", "2"]; "#6 Query matches block case insensitively")]
    #[test_case(RoomFilters { query: Some("LAB".to_string()), ..Default::default() },
        vec!["5"]; "#7 Query matches room name")]
    #[test_case(RoomFilters { query: Some(String::new()), ..Default::default() },
        vec!["1", "2", "3", "4", "5", "6"]; "#8 Empty query is inert")]
    #[test_case(RoomFilters { available: Some(true), ..Default::default() },
        vec!["1", "3", "4", "6"]; "#9 Available only")]
    #[test_case(RoomFilters { available: Some(false), ..Default::default() },
        vec!["1", "2", "3", "4", "5", "6"]; "#10 Available false does not filter")]
    #[test_case(RoomFilters { block: Some("Bloco B".to_string()), capacity: Some(30), resources: Some(vec!["3".to_string()]), query: Some("sala".to_string()), available: Some(true) },
        vec!["3"]; "#11 Combined filters")]
    fn test_apply_filters(filters: RoomFilters, expected_ids: Vec<&str>) {
        let filter = InventoryFilter::new();
        let result = filter.apply(&inventory(), &filters);

        let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, expected_ids);
    }

    #[test]
    fn test_no_filters_is_identity() {
        let filter = InventoryFilter::new();
        let rooms = inventory();

        assert_eq!(filter.apply(&rooms, &RoomFilters::default()), rooms);
        for room in &rooms {
            assert_eq!(
                filter.apply(std::slice::from_ref(room), &RoomFilters::default()),
                vec![room.clone()]
            );
        }
    }

    #[test]
    fn test_capacity_scenario() {
        let filter = InventoryFilter::new();
        let rooms = vec![
            room("1", "Sala 101", "Bloco A", 40, &["proj", "ac"]),
            room("2", "Sala 102", "Bloco A", 25, &["proj"]),
        ];
        let filters = RoomFilters {
            capacity: Some(30),
            ..Default::default()
        };

        assert_eq!(filter.apply(&rooms, &filters), vec![rooms[0].clone()]);
    }

    #[test]
    fn test_resource_superset() {
        let filter = InventoryFilter::new();
        let filters = RoomFilters {
            resources: Some(vec!["1".to_string(), "4".to_string()]),
            ..Default::default()
        };

        assert!(filter.matches(&room("1", "A", "Bloco A", 10, &["1", "3", "4"]), &filters));
        assert!(!filter.matches(&room("2", "B", "Bloco A", 10, &["1", "3"]), &filters));
    }
}
