// In-memory ordering for the sort keys the store can't order by.
//
// Sorts are stable: equal keys keep the order the store returned them in.
// Listings without the key go last, whichever direction is requested.

use std::cmp::Ordering;

use crate::filters::SortBy;
use crate::models::CarListing;

pub fn order(page: &mut [CarListing], sort_by: SortBy) {
    let (key, descending): (fn(&CarListing) -> Option<f64>, bool) = match sort_by {
        SortBy::PriceLow => (CarListing::selling_price, false),
        SortBy::PriceHigh => (CarListing::selling_price, true),
        SortBy::MileageLow => (CarListing::mileage, false),
        SortBy::MileageHigh => (CarListing::mileage, true),
        // Already ordered by the store
        SortBy::Newest | SortBy::YearNew | SortBy::YearOld => return,
    };

    page.sort_by(|a, b| compare_keys(key(a), key(b), descending));
}

fn compare_keys(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.total_cmp(&y);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn car(id: &str, price: Option<f64>, mileage: Option<&str>) -> CarListing {
        serde_json::from_value(json!({
            "$id": id,
            "status": "published",
            "availability": true,
            "condition": "used",
            "year": "2019",
            "pricing_payments": price.map(|p| json!({ "selling_price": p })),
            "car_specifications": mileage.map(|m| json!({ "mileage": m })),
        }))
        .unwrap()
    }

    fn ids(page: &[CarListing]) -> Vec<&str> {
        page.iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn price_low_is_ascending_and_stable() {
        let mut page = vec![
            car("a", Some(500000.0), None),
            car("b", Some(300000.0), None),
            car("c", Some(500000.0), None),
            car("d", Some(900000.0), None),
        ];
        order(&mut page, SortBy::PriceLow);
        assert_eq!(ids(&page), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn price_high_is_descending_and_stable() {
        let mut page = vec![
            car("a", Some(500000.0), None),
            car("b", Some(900000.0), None),
            car("c", Some(500000.0), None),
        ];
        order(&mut page, SortBy::PriceHigh);
        assert_eq!(ids(&page), vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_keys_go_last_in_both_directions() {
        let page = vec![
            car("none-1", None, None),
            car("mid", Some(2.0), None),
            car("none-2", None, None),
            car("low", Some(1.0), None),
        ];

        let mut asc = page.clone();
        order(&mut asc, SortBy::PriceLow);
        assert_eq!(ids(&asc), vec!["low", "mid", "none-1", "none-2"]);

        let mut desc = page;
        order(&mut desc, SortBy::PriceHigh);
        assert_eq!(ids(&desc), vec!["mid", "low", "none-1", "none-2"]);
    }

    #[test]
    fn mileage_orders_by_parsed_value() {
        let mut page = vec![
            car("far", None, Some("120000")),
            car("near", None, Some("9000")),
            car("mid", None, Some("45000")),
        ];
        order(&mut page, SortBy::MileageLow);
        assert_eq!(ids(&page), vec!["near", "mid", "far"]);

        order(&mut page, SortBy::MileageHigh);
        assert_eq!(ids(&page), vec!["far", "mid", "near"]);
    }

    #[test]
    fn native_sorts_leave_page_untouched() {
        let original = vec![car("x", Some(3.0), None), car("y", Some(1.0), None)];
        for sort_by in [SortBy::Newest, SortBy::YearNew, SortBy::YearOld] {
            let mut page = original.clone();
            order(&mut page, sort_by);
            assert_eq!(page, original);
        }
    }
}
