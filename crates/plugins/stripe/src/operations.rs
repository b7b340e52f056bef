//! Table of Stripe operations reachable through the request forwarder.
//!
//! A method name is a dotted path, `<resource>.<verb>`, where the resource may
//! itself be namespaced (`checkout.sessions.create`). Names not in this table
//! are rejected before anything is sent to Stripe.

use paybridge_core::{IntegrationError, IntegrationResult};
use serde_json::{Map, Value};

use crate::transport::{ApiRequest, HttpMethod, RequestOptions};

/// Positional argument layout of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    /// `[params?, options?]`
    Params,
    /// `[id, params?, options?]`
    IdParams,
}

/// Standard verb on a resource collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Retrieve,
    Update,
    Del,
    List,
}

impl Verb {
    fn name(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Retrieve => "retrieve",
            Verb::Update => "update",
            Verb::Del => "del",
            Verb::List => "list",
        }
    }
}

/// Non-standard endpoint on a resource.
#[derive(Debug, Clone, Copy)]
struct Action {
    name: &'static str,
    http_method: HttpMethod,
    shape: ArgShape,
    /// Path segment appended after the id, if any.
    suffix: Option<&'static str>,
}

const fn action(name: &'static str, suffix: &'static str) -> Action {
    Action {
        name,
        http_method: HttpMethod::Post,
        shape: ArgShape::IdParams,
        suffix: Some(suffix),
    }
}

#[derive(Debug)]
struct Resource {
    name: &'static str,
    path: &'static str,
    verbs: &'static [Verb],
    actions: &'static [Action],
}

use Verb::*;

const CRUDL: &[Verb] = &[Create, Retrieve, Update, Del, List];
const CRUL: &[Verb] = &[Create, Retrieve, Update, List];
const RL: &[Verb] = &[Retrieve, List];

static RESOURCES: &[Resource] = &[
    Resource { name: "accounts", path: "/v1/accounts", verbs: CRUDL, actions: &[] },
    Resource { name: "balance", path: "/v1/balance", verbs: &[], actions: &[Action {
        name: "retrieve",
        http_method: HttpMethod::Get,
        shape: ArgShape::Params,
        suffix: None,
    }] },
    Resource { name: "balanceTransactions", path: "/v1/balance_transactions", verbs: RL, actions: &[] },
    Resource { name: "charges", path: "/v1/charges", verbs: CRUL, actions: &[action("capture", "capture")] },
    Resource { name: "coupons", path: "/v1/coupons", verbs: CRUDL, actions: &[] },
    Resource { name: "customers", path: "/v1/customers", verbs: CRUDL, actions: &[] },
    Resource { name: "events", path: "/v1/events", verbs: RL, actions: &[] },
    Resource { name: "invoiceItems", path: "/v1/invoiceitems", verbs: CRUDL, actions: &[] },
    Resource { name: "invoices", path: "/v1/invoices", verbs: CRUDL, actions: &[
        action("finalizeInvoice", "finalize"),
        action("pay", "pay"),
        action("sendInvoice", "send"),
        action("voidInvoice", "void"),
    ] },
    Resource { name: "paymentIntents", path: "/v1/payment_intents", verbs: CRUL, actions: &[
        action("confirm", "confirm"),
        action("capture", "capture"),
        action("cancel", "cancel"),
    ] },
    Resource { name: "paymentMethods", path: "/v1/payment_methods", verbs: CRUL, actions: &[
        action("attach", "attach"),
        action("detach", "detach"),
    ] },
    Resource { name: "payouts", path: "/v1/payouts", verbs: CRUL, actions: &[action("cancel", "cancel")] },
    Resource { name: "prices", path: "/v1/prices", verbs: CRUL, actions: &[] },
    Resource { name: "products", path: "/v1/products", verbs: CRUDL, actions: &[] },
    Resource { name: "refunds", path: "/v1/refunds", verbs: CRUL, actions: &[] },
    Resource { name: "setupIntents", path: "/v1/setup_intents", verbs: CRUL, actions: &[
        action("confirm", "confirm"),
        action("cancel", "cancel"),
    ] },
    Resource { name: "subscriptionItems", path: "/v1/subscription_items", verbs: CRUDL, actions: &[] },
    Resource { name: "subscriptions", path: "/v1/subscriptions", verbs: CRUL, actions: &[Action {
        name: "cancel",
        http_method: HttpMethod::Delete,
        shape: ArgShape::IdParams,
        suffix: None,
    }] },
    Resource { name: "transfers", path: "/v1/transfers", verbs: CRUL, actions: &[] },
    Resource { name: "webhookEndpoints", path: "/v1/webhook_endpoints", verbs: CRUDL, actions: &[] },
    Resource { name: "checkout.sessions", path: "/v1/checkout/sessions", verbs: &[Create, Retrieve, List], actions: &[
        action("expire", "expire"),
    ] },
    Resource { name: "billingPortal.sessions", path: "/v1/billing_portal/sessions", verbs: &[Create], actions: &[] },
];

/// A resolved Stripe operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// HTTP method of the endpoint.
    pub http_method: HttpMethod,
    /// Argument layout.
    pub shape: ArgShape,
    base: &'static str,
    suffix: Option<&'static str>,
}

impl Operation {
    /// Resolves a dotted method name against the table.
    pub fn lookup(method: &str) -> Option<Self> {
        let (resource_name, verb_name) = method.rsplit_once('.')?;
        let resource = RESOURCES.iter().find(|r| r.name == resource_name)?;

        if let Some(verb) = resource.verbs.iter().find(|v| v.name() == verb_name) {
            let (http_method, shape) = match verb {
                Create => (HttpMethod::Post, ArgShape::Params),
                List => (HttpMethod::Get, ArgShape::Params),
                Retrieve => (HttpMethod::Get, ArgShape::IdParams),
                Update => (HttpMethod::Post, ArgShape::IdParams),
                Del => (HttpMethod::Delete, ArgShape::IdParams),
            };
            return Some(Self {
                http_method,
                shape,
                base: resource.path,
                suffix: None,
            });
        }

        resource
            .actions
            .iter()
            .find(|a| a.name == verb_name)
            .map(|a| Self {
                http_method: a.http_method,
                shape: a.shape,
                base: resource.path,
                suffix: a.suffix,
            })
    }

    /// Whether `method` names an operation in the table.
    pub fn exists(method: &str) -> bool {
        Self::lookup(method).is_some()
    }

    /// Every method name in the table.
    pub fn names() -> Vec<String> {
        RESOURCES
            .iter()
            .flat_map(|r| {
                r.verbs
                    .iter()
                    .map(|v| v.name())
                    .chain(r.actions.iter().map(|a| a.name))
                    .map(move |verb| format!("{}.{}", r.name, verb))
            })
            .collect()
    }

    /// Binds positional arguments to this operation.
    ///
    /// `method` is only used in error messages.
    pub fn bind(&self, method: &str, args: &[Value]) -> IntegrationResult<ApiRequest> {
        let invalid = |reason: &str| {
            IntegrationError::invalid_payload(format!("Invalid arguments for Stripe method {}: {}", method, reason))
        };

        let (path, rest) = match self.shape {
            ArgShape::Params => (self.base.to_string(), args),
            ArgShape::IdParams => {
                let id = match args.first() {
                    Some(Value::String(id)) if is_valid_id(id) => id,
                    Some(Value::String(_)) => return Err(invalid("malformed object id")),
                    _ => return Err(invalid("object id expected as first argument")),
                };
                let path = match self.suffix {
                    Some(suffix) => format!("{}/{}/{}", self.base, id, suffix),
                    None => format!("{}/{}", self.base, id),
                };
                (path, &args[1..])
            }
        };

        if rest.len() > 2 {
            return Err(invalid("too many arguments"));
        }

        let params = match rest.first() {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => flatten_params(map),
            Some(_) => return Err(invalid("params must be an object")),
        };

        let options = match rest.get(1) {
            None | Some(Value::Null) => RequestOptions::default(),
            Some(Value::Object(map)) => RequestOptions::from_map(map).map_err(|reason| invalid(&reason))?,
            Some(_) => return Err(invalid("options must be an object")),
        };

        Ok(ApiRequest {
            method: self.http_method,
            path,
            params,
            options,
        })
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Flattens a params object into bracket-notation form pairs.
///
/// `{"metadata": {"k": "v"}, "items": [{"price": "p"}]}` becomes
/// `metadata[k]=v` and `items[0][price]=p`. `null` is sent as an empty
/// string, which Stripe reads as "unset".
pub fn flatten_params(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        flatten_into(&mut pairs, key.clone(), value);
    }
    pairs
}

fn flatten_into(pairs: &mut Vec<(String, String)>, prefix: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(pairs, format!("{}[{}]", prefix, key), value);
            }
        }
        Value::Array(items) => {
            for (i, value) in items.iter().enumerate() {
                flatten_into(pairs, format!("{}[{}]", prefix, i), value);
            }
        }
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Null => pairs.push((prefix, String::new())),
        other => pairs.push((prefix, other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup() {
        let op = Operation::lookup("customers.create").unwrap();
        assert_eq!(op.http_method, HttpMethod::Post);
        assert_eq!(op.shape, ArgShape::Params);

        let op = Operation::lookup("checkout.sessions.expire").unwrap();
        assert_eq!(op.shape, ArgShape::IdParams);

        assert!(Operation::lookup("customers.explode").is_none());
        assert!(Operation::lookup("prices.del").is_none());
        assert!(Operation::lookup("sessions.create").is_none());
        assert!(Operation::lookup("customers").is_none());
        assert!(Operation::lookup("").is_none());
    }

    #[test]
    fn test_names_resolve() {
        let names = Operation::names();
        assert!(names.contains(&"balance.retrieve".to_string()));
        assert!(names.contains(&"invoices.finalizeInvoice".to_string()));
        for name in names {
            assert!(Operation::exists(&name), "{name}");
        }
    }

    #[test]
    fn test_bind_paths() {
        let req = Operation::lookup("customers.update")
            .unwrap()
            .bind("customers.update", &[json!("cus_1"), json!({"name": "Jenny"})])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/v1/customers/cus_1");
        assert_eq!(req.params, vec![("name".to_string(), "Jenny".to_string())]);

        let req = Operation::lookup("invoices.voidInvoice")
            .unwrap()
            .bind("invoices.voidInvoice", &[json!("in_1")])
            .unwrap();
        assert_eq!(req.path, "/v1/invoices/in_1/void");

        let req = Operation::lookup("subscriptions.cancel")
            .unwrap()
            .bind("subscriptions.cancel", &[json!("sub_1")])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "/v1/subscriptions/sub_1");

        let req = Operation::lookup("balance.retrieve")
            .unwrap()
            .bind("balance.retrieve", &[json!({})])
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/v1/balance");
    }

    #[test]
    fn test_bind_rejects_bad_shapes() {
        let op = Operation::lookup("customers.retrieve").unwrap();
        for args in [
            vec![json!({})],
            vec![json!(42)],
            vec![json!("cus/../x")],
            vec![json!("")],
            vec![json!("cus_1"), json!("nope")],
            vec![json!("cus_1"), json!({}), json!({}), json!({})],
        ] {
            let err = op.bind("customers.retrieve", &args).unwrap_err();
            assert_eq!(err.status_code(), 400, "{args:?}");
        }

        let op = Operation::lookup("customers.create").unwrap();
        assert!(op.bind("customers.create", &[json!([1, 2])]).is_err());
        assert!(op.bind("customers.create", &[]).is_ok());
        assert!(op.bind("customers.create", &[Value::Null]).is_ok());
    }

    #[test]
    fn test_bind_options() {
        let req = Operation::lookup("customers.create")
            .unwrap()
            .bind(
                "customers.create",
                &[json!({}), json!({"idempotencyKey": "idem_1", "stripeAccount": "acct_1"})],
            )
            .unwrap();
        assert_eq!(req.options.idempotency_key.as_deref(), Some("idem_1"));
        assert_eq!(req.options.stripe_account.as_deref(), Some("acct_1"));

        let err = Operation::lookup("customers.create")
            .unwrap()
            .bind("customers.create", &[json!({}), json!({"apiKey": "sk_other"})])
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_flatten_params() {
        let params = json!({
            "email": "a@b.c",
            "metadata": { "order": "42" },
            "items": [{ "price": "price_1", "quantity": 2 }],
            "description": null,
            "livemode": false
        });
        let mut pairs = flatten_params(params.as_object().unwrap());
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("description".to_string(), "".to_string()),
                ("email".to_string(), "a@b.c".to_string()),
                ("items[0][price]".to_string(), "price_1".to_string()),
                ("items[0][quantity]".to_string(), "2".to_string()),
                ("livemode".to_string(), "false".to_string()),
                ("metadata[order]".to_string(), "42".to_string()),
            ]
        );
    }
}
