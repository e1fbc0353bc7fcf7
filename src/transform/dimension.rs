use crate::transform::Observation;
use std::collections::BTreeSet;
use std::collections::HashMap;
use tracing::warn;

/// A row of the area dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Area {
    pub code: String,
    pub name: String,
}

/// Reference values shared by both fact tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Unique by code, in order of first appearance
    pub areas: Vec<Area>,
    /// Distinct, ascending
    pub years: Vec<i32>,
}

/// Collects the areas and years the observations refer to.
///
/// An area seen under more than one name keeps the last name seen, housing
/// observations first and waiting list observations after them.
pub fn build_dimensions(housing: &[Observation], waiting: &[Observation]) -> Dimensions {
    let mut areas = Vec::<Area>::new();
    let mut positions = HashMap::<&str, usize>::new();
    let mut years = BTreeSet::<i32>::new();

    for observation in housing.iter().chain(waiting) {
        years.insert(observation.year);
        match positions.get(observation.area_code.as_str()) {
            Some(&index) => {
                let area = &mut areas[index];
                if area.name != observation.name {
                    warn!(
                        code = area.code.as_str(),
                        previous = area.name.as_str(),
                        name = observation.name.as_str(),
                        "area renamed between observations, keeping the latest name"
                    );
                    area.name = observation.name.to_owned();
                }
            }
            None => {
                positions.insert(&observation.area_code, areas.len());
                areas.push(Area {
                    code: observation.area_code.to_owned(),
                    name: observation.name.to_owned(),
                });
            }
        }
    }

    Dimensions {
        areas,
        years: years.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn observation(year: i32, code: &str, name: &str) -> Observation {
        Observation {
            year,
            area_code: code.to_string(),
            name: name.to_string(),
            value: 1,
        }
    }

    #[test]
    fn areas_are_unique_by_code() {
        let housing = vec![
            observation(1997, "E09000001", "Camden"),
            observation(1998, "E09000001", "Camden"),
            observation(1997, "E09000002", "Barnet"),
        ];
        let waiting = vec![observation(2001, "E09000002", "Barnet"), observation(2001, "E09000003", "Brent")];
        let dimensions = build_dimensions(&housing, &waiting);
        let codes = dimensions.areas.iter().map(|area| area.code.as_str()).collect::<Vec<_>>();
        assert_eq!(codes, vec!["E09000001", "E09000002", "E09000003"]);
        assert_eq!(codes.iter().collect::<HashSet<_>>().len(), codes.len());
    }

    #[test]
    fn last_seen_name_wins() {
        let housing = vec![observation(1997, "E09000001", "Camden")];
        let waiting = vec![observation(2001, "E09000001", "London Borough of Camden")];
        let dimensions = build_dimensions(&housing, &waiting);
        assert_eq!(
            dimensions.areas,
            vec![Area { code: "E09000001".into(), name: "London Borough of Camden".into() }]
        );
    }

    #[test]
    fn years_are_sorted_and_distinct() {
        let housing = vec![observation(1999, "A", "a"), observation(1997, "A", "a")];
        let waiting = vec![observation(1998, "B", "b"), observation(1997, "B", "b")];
        assert_eq!(build_dimensions(&housing, &waiting).years, vec![1997, 1998, 1999]);
    }

    #[test]
    fn empty_inputs_give_empty_dimensions() {
        assert_eq!(build_dimensions(&[], &[]), Dimensions::default());
    }
}
