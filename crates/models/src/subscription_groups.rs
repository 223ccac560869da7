use std::collections::HashMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::format_count;
use crate::{or_no_data, Alert, EntityRef, NO_DATA_MARKER};

/// Subscription group as returned by `GET /api/subscription-groups`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubscriptionGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    /// Legacy association of alerts, without enumeration items.
    /// Consulted only if `alert_associations` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<EntityRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_associations: Option<Vec<AlertAssociation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_schemes: Option<NotificationSchemes>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertAssociation {
    pub alert: EntityRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration_item: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSchemes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailScheme>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailScheme {
    pub to: Vec<String>,
}

/// Enumeration item (a dimension combination of an alert)
/// as returned by `GET /api/enumeration-items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumerationItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Map<String, Value>>,
}

impl SubscriptionGroup {
    /// IDs of the alerts associated with this group, in association order.
    pub fn alert_ids(&self) -> Vec<i64> {
        self.alert_enumeration_items()
            .into_iter()
            .map(|(alert_id, _)| alert_id)
            .collect()
    }

    // Distinct associated alert IDs, in order of first association, and the
    // enumeration item IDs associated with each.
    fn alert_enumeration_items(&self) -> Vec<(i64, Vec<i64>)> {
        let mut out: Vec<(i64, Vec<i64>)> = Vec::new();

        match self.alert_associations.as_deref() {
            Some(associations) if !associations.is_empty() => {
                for association in associations {
                    let Some(alert_id) = association.alert.id else {
                        continue;
                    };
                    let index = match out.iter().position(|(id, _)| *id == alert_id) {
                        Some(index) => index,
                        None => {
                            out.push((alert_id, Vec::new()));
                            out.len() - 1
                        }
                    };
                    if let Some(item_id) = association.enumeration_item.as_ref().and_then(|i| i.id) {
                        out[index].1.push(item_id);
                    }
                }
            }
            _ => {
                for alert_id in self.alerts.iter().flatten().filter_map(|a| a.id) {
                    if !out.iter().any(|(id, _)| *id == alert_id) {
                        out.push((alert_id, Vec::new()));
                    }
                }
            }
        }
        out
    }
}

/// Subscription group shaped for display and search.
/// The source subscription group is retained, but isn't searched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSubscriptionGroup {
    pub id: i64,
    pub name: String,
    pub cron: String,
    pub alerts: Vec<UiSubscriptionGroupAlert>,
    pub alert_count: String,
    pub dimension_count: String,
    pub emails: Vec<String>,
    pub email_count: String,
    pub subscription_group: Option<SubscriptionGroup>,
}

impl Default for UiSubscriptionGroup {
    fn default() -> Self {
        Self {
            id: -1,
            name: NO_DATA_MARKER.to_string(),
            cron: NO_DATA_MARKER.to_string(),
            alerts: Vec::new(),
            alert_count: format_count(0),
            dimension_count: format_count(0),
            emails: Vec::new(),
            email_count: format_count(0),
            subscription_group: None,
        }
    }
}

impl search::Searchable for UiSubscriptionGroup {
    const EXCLUDED_FIELDS: &'static [&'static str] = &["/subscriptionGroup"];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSubscriptionGroupAlert {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enumeration_items: Vec<EnumerationItem>,
}

/// Shape `subscription_group` for display, resolving its associated
/// `alerts` and `enumeration_items`.
pub fn get_ui_subscription_group(
    subscription_group: &SubscriptionGroup,
    alerts: &[Alert],
    enumeration_items: &[EnumerationItem],
) -> UiSubscriptionGroup {
    let alerts_by_group = alerts_by_subscription_group(
        std::slice::from_ref(subscription_group),
        alerts,
        enumeration_items,
    );
    ui_subscription_group(subscription_group, &alerts_by_group)
}

/// Shape each of `subscription_groups` for display, in order.
pub fn get_ui_subscription_groups(
    subscription_groups: &[SubscriptionGroup],
    alerts: &[Alert],
    enumeration_items: &[EnumerationItem],
) -> Vec<UiSubscriptionGroup> {
    if subscription_groups.is_empty() {
        return Vec::new();
    }
    let alerts_by_group =
        alerts_by_subscription_group(subscription_groups, alerts, enumeration_items);

    subscription_groups
        .iter()
        .map(|group| ui_subscription_group(group, &alerts_by_group))
        .collect()
}

fn ui_subscription_group(
    group: &SubscriptionGroup,
    alerts_by_group: &HashMap<i64, Vec<UiSubscriptionGroupAlert>>,
) -> UiSubscriptionGroup {
    let alerts = group
        .id
        .and_then(|id| alerts_by_group.get(&id))
        .cloned()
        .unwrap_or_default();

    let dimension_count = alerts
        .iter()
        .flat_map(|alert| alert.enumeration_items.iter().map(|item| item.id))
        .unique()
        .count();

    let emails = group
        .notification_schemes
        .as_ref()
        .and_then(|schemes| schemes.email.as_ref())
        .map(|email| email.to.clone())
        .unwrap_or_default();

    UiSubscriptionGroup {
        id: group.id.unwrap_or(-1),
        name: or_no_data(group.name.as_deref()),
        cron: or_no_data(group.cron.as_deref()),
        alert_count: format_count(alerts.len()),
        dimension_count: format_count(dimension_count),
        email_count: format_count(emails.len()),
        alerts,
        emails,
        subscription_group: Some(group.clone()),
    }
}

// Map subscription group IDs to their resolved alerts. Associations of
// unknown alerts are skipped, as are unknown enumeration items.
fn alerts_by_subscription_group(
    subscription_groups: &[SubscriptionGroup],
    alerts: &[Alert],
    enumeration_items: &[EnumerationItem],
) -> HashMap<i64, Vec<UiSubscriptionGroupAlert>> {
    let mut out: HashMap<i64, Vec<UiSubscriptionGroupAlert>> = HashMap::new();

    let alerts: HashMap<i64, &Alert> = alerts
        .iter()
        .filter_map(|alert| Some((alert.id?, alert)))
        .collect();
    let enumeration_items: HashMap<i64, &EnumerationItem> = enumeration_items
        .iter()
        .filter_map(|item| Some((item.id?, item)))
        .collect();

    if alerts.is_empty() {
        return out;
    }

    for group in subscription_groups {
        for (alert_id, item_ids) in group.alert_enumeration_items() {
            let Some(alert) = alerts.get(&alert_id) else {
                tracing::debug!(group = ?group.id, alert_id, "subscription group references an unknown alert");
                continue;
            };

            let ui_alert = UiSubscriptionGroupAlert {
                id: alert_id,
                name: or_no_data(alert.name.as_deref()),
                enumeration_items: item_ids
                    .iter()
                    .filter_map(|id| enumeration_items.get(id).map(|item| (*item).clone()))
                    .collect(),
            };
            out.entry(group.id.unwrap_or(-1)).or_default().push(ui_alert);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture() -> (Vec<SubscriptionGroup>, Vec<Alert>, Vec<EnumerationItem>) {
        let groups = serde_json::from_value(json!([
            {
                "id": 100,
                "name": "checkout-oncall",
                "cron": "0 */5 * * * ?",
                "alertAssociations": [
                    {"alert": {"id": 1}, "enumerationItem": {"id": 11}},
                    {"alert": {"id": 2}},
                    {"alert": {"id": 1}, "enumerationItem": {"id": 12}},
                    {"alert": {"id": 1}, "enumerationItem": {"id": 99}},
                    {"alert": {"id": 404}}
                ],
                "alerts": [{"id": 3}],
                "notificationSchemes": {"email": {"to": ["a@example.com", "b@example.com"]}}
            },
            {"id": 200, "alerts": [{"id": 3}, {"id": 3}]},
            {"id": 300, "name": "nothing"}
        ]))
        .unwrap();
        let alerts = serde_json::from_value(json!([
            {"id": 1, "name": "revenue"},
            {"id": 2, "name": "latency"},
            {"id": 3}
        ]))
        .unwrap();
        let items = serde_json::from_value(json!([
            {"id": 11, "name": "country=US"},
            {"id": 12, "name": "country=DE"}
        ]))
        .unwrap();

        (groups, alerts, items)
    }

    #[test]
    fn test_ui_subscription_groups_are_shaped() {
        let (groups, alerts, items) = fixture();
        let mut ui = get_ui_subscription_groups(&groups, &alerts, &items);
        for group in ui.iter_mut() {
            assert!(group.subscription_group.is_some());
            group.subscription_group = None;
        }

        insta::assert_json_snapshot!(ui, @r###"
        [
          {
            "id": 100,
            "name": "checkout-oncall",
            "cron": "0 */5 * * * ?",
            "alerts": [
              {
                "id": 1,
                "name": "revenue",
                "enumerationItems": [
                  {
                    "id": 11,
                    "name": "country=US"
                  },
                  {
                    "id": 12,
                    "name": "country=DE"
                  }
                ]
              },
              {
                "id": 2,
                "name": "latency"
              }
            ],
            "alertCount": "2",
            "dimensionCount": "2",
            "emails": [
              "a@example.com",
              "b@example.com"
            ],
            "emailCount": "2",
            "subscriptionGroup": null
          },
          {
            "id": 200,
            "name": "-",
            "cron": "-",
            "alerts": [
              {
                "id": 3,
                "name": "-"
              }
            ],
            "alertCount": "1",
            "dimensionCount": "0",
            "emails": [],
            "emailCount": "0",
            "subscriptionGroup": null
          },
          {
            "id": 300,
            "name": "nothing",
            "cron": "-",
            "alerts": [],
            "alertCount": "0",
            "dimensionCount": "0",
            "emails": [],
            "emailCount": "0",
            "subscriptionGroup": null
          }
        ]
        "###);
    }

    #[test]
    fn test_alert_ids_prefer_associations() {
        let (groups, _, _) = fixture();
        assert_eq!(groups[0].alert_ids(), vec![1, 2, 404]);
        assert_eq!(groups[1].alert_ids(), vec![3]);
        assert!(groups[2].alert_ids().is_empty());
    }

    #[test]
    fn test_single_group_without_alerts() {
        let (groups, _, items) = fixture();
        let ui = get_ui_subscription_group(&groups[0], &[], &items);
        assert!(ui.alerts.is_empty());
        assert_eq!(ui.alert_count, "0");
        assert_eq!(ui.email_count, "2");
    }

    #[test]
    fn test_source_group_is_retained_but_not_searched() {
        let (groups, alerts, items) = fixture();
        let ui = get_ui_subscription_groups(&groups, &alerts, &items);

        // "*/5" only appears in the cron of the first group, which is shown.
        let found = search::filter_entities(&ui, &["*/5"]);
        assert_eq!(found.iter().map(|g| g.id).collect::<Vec<_>>(), vec![100]);

        // Alert 404 is associated but unknown, so it's only within the source.
        let words = search::search_words("404");
        assert!(search::filter_entities(&ui, &words).is_empty());

        let found = search::filter_entities(&ui, &["country=de", "B@EXAMPLE"]);
        assert_eq!(found.len(), 1);
    }
}
