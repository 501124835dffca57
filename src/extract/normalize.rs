use chrono::{NaiveDate, NaiveDateTime};

const SEPARATOR: &str = " - ";

const DATETIME_FORMATS: [&str; 2] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Instant embedded in a movement string.
///
/// The leading token (before the first `" - "`, or the whole string when
/// there is none) is tried first, then the trailing one (after the last `" - "`).
pub fn parse_date_token(movement: &str) -> Option<NaiveDateTime> {
    let head = movement
        .split_once(SEPARATOR)
        .map_or(movement, |(head, _)| head);
    parse_instant(head).or_else(|| {
        movement
            .rsplit_once(SEPARATOR)
            .and_then(|(_, tail)| parse_instant(tail))
    })
}

fn parse_instant(token: &str) -> Option<NaiveDateTime> {
    let token = token.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Most recent first. Undated entries go last; ties keep their input order.
pub fn sort_descending(movements: Vec<String>) -> Vec<String> {
    let mut keyed: Vec<(Option<NaiveDateTime>, String)> = movements
        .into_iter()
        .map(|m| (parse_date_token(&m), m))
        .collect();

    // None < Some(_), so comparing b against a also sinks undated entries.
    keyed.sort_by(|(a, _), (b, _)| b.cmp(a));

    keyed.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_leading_date() {
        let dt = parse_date_token("15/02/2023 14:30:05 - Juntada de Petição").unwrap();
        assert_eq!(dt.to_string(), "2023-02-15 14:30:05");
    }

    #[test]
    fn test_parse_trailing_date() {
        let dt = parse_date_token("Distribuído por sorteio - 01/03/2023").unwrap();
        assert_eq!(dt.to_string(), "2023-03-01 00:00:00");
    }

    #[test]
    fn test_parse_without_separator() {
        let dt = parse_date_token("01/03/2023").unwrap();
        assert_eq!(dt.to_string(), "2023-03-01 00:00:00");
        assert!(parse_date_token("sem data").is_none());
        assert!(parse_date_token("Sem data - ontem").is_none());
    }

    #[test]
    fn test_bare_date_is_ordered() {
        let sorted = sort_descending(strings(&[
            "X - 01/01/2023",
            "01/01/2020",
            "05/05/2024",
        ]));
        assert_eq!(
            sorted,
            strings(&["05/05/2024", "X - 01/01/2023", "01/01/2020"])
        );
    }

    #[test]
    fn test_sorts_most_recent_first() {
        let sorted = sort_descending(strings(&[
            "Conclusos - 02/01/2023",
            "Distribuído - 01/01/2023",
            "Sentença - 03/01/2023",
        ]));
        assert_eq!(
            sorted,
            strings(&[
                "Sentença - 03/01/2023",
                "Conclusos - 02/01/2023",
                "Distribuído - 01/01/2023",
            ])
        );
    }

    #[test]
    fn test_day_first_ordering() {
        // 01/02 is February 1st, later than 31/01.
        let sorted = sort_descending(strings(&[
            "31/01/2023 - A",
            "01/02/2023 - B",
        ]));
        assert_eq!(sorted, strings(&["01/02/2023 - B", "31/01/2023 - A"]));
    }

    #[test]
    fn test_time_breaks_same_day() {
        let sorted = sort_descending(strings(&[
            "10/05/2023 08:00:00 - manhã",
            "10/05/2023 17:45:00 - tarde",
        ]));
        assert_eq!(
            sorted,
            strings(&["10/05/2023 17:45:00 - tarde", "10/05/2023 08:00:00 - manhã"])
        );
    }

    #[test]
    fn test_unparseable_sink_and_keep_order() {
        let sorted = sort_descending(strings(&[
            "sem data",
            "Despacho - 01/01/2022",
            "data inválida - 99/99/2023",
            "Sentença - 05/06/2023",
        ]));
        assert_eq!(
            sorted,
            strings(&[
                "Sentença - 05/06/2023",
                "Despacho - 01/01/2022",
                "sem data",
                "data inválida - 99/99/2023",
            ])
        );
    }

    #[test]
    fn test_ties_are_stable() {
        let sorted = sort_descending(strings(&[
            "Primeiro - 01/01/2023",
            "Segundo - 01/01/2023",
            "Terceiro - 01/01/2023",
        ]));
        assert_eq!(
            sorted,
            strings(&[
                "Primeiro - 01/01/2023",
                "Segundo - 01/01/2023",
                "Terceiro - 01/01/2023",
            ])
        );
    }

    #[test]
    fn test_length_order_and_idempotence() {
        let input = strings(&[
            "c - 12/12/2021",
            "??",
            "a - 01/01/2024",
            "b - 2023-07-04",
            "d - 01/01/2024",
            "e - xx",
        ]);
        let once = sort_descending(input.clone());
        assert_eq!(once.len(), input.len());

        for pair in once.windows(2) {
            let (a, b) = (parse_date_token(&pair[0]), parse_date_token(&pair[1]));
            assert!(b.is_none() || a >= b, "{:?} before {:?}", pair[0], pair[1]);
        }

        let twice = sort_descending(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty() {
        assert!(sort_descending(Vec::new()).is_empty());
    }
}
