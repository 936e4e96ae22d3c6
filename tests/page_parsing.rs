use bdl_rs::models::Page;
use serde_json::json;

#[test]
fn parse_sample_json() {
    let sample = r#"
    {
      "totalRecords": 250,
      "page": 0,
      "pageSize": 100,
      "results": [
        {
          "id": "011212001000",
          "name": "Krakow",
          "values": [
            {"year": "2020", "val": 779115, "attrId": 1},
            {"year": "2021", "val": 800653, "attrId": 1}
          ]
        },
        {
          "id": "071412865000",
          "name": "Warszawa",
          "values": [
            {"year": "2020", "val": 1790658, "attrId": 1}
          ]
        }
      ]
    }
    "#;

    let page: Page = serde_json::from_str(sample).unwrap();
    assert_eq!(page.total_records, 250);
    assert_eq!(page.results.len(), 2);
    // Years arrive as strings and are normalized to integers.
    assert_eq!(page.results[0].values[0].year, 2020);
    assert_eq!(page.results[0].values[1].year, 2021);

    let mut table = Page::empty_table();
    page.append_rows(&mut table);
    assert_eq!(table.columns(), ["val", "year", "attrId", "id", "name"]);
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.rows()[2],
        vec![
            json!(1_790_658),
            json!(2020),
            json!(1),
            json!("071412865000"),
            json!("Warszawa")
        ]
    );
}

#[test]
fn parse_numeric_ids_and_null_values() {
    // Some endpoints serialize unit ids as numbers, and values may be null.
    let sample = r#"
    {
      "totalRecords": 1,
      "results": [
        {
          "id": 11212001000,
          "name": "Krakow",
          "values": [
            {"year": 2020, "val": null, "attrId": 0}
          ]
        }
      ]
    }
    "#;

    let page: Page = serde_json::from_str(sample).unwrap();
    assert_eq!(page.results[0].id, "11212001000");
    assert_eq!(page.results[0].values[0].val, serde_json::Value::Null);
}

#[test]
fn missing_results_defaults_to_empty() {
    let page: Page = serde_json::from_str(r#"{"totalRecords": 0}"#).unwrap();
    assert_eq!(page.total_records, 0);
    assert!(page.results.is_empty());
}
