use serde_json::{Value, json};

/// Key prefix of every item created for a mock alert.
pub const ALERT_KEY_PREFIX: &str = "alert.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockAlert {
    pub description: &'static str,
    pub priority: u8,
    pub host_name: &'static str,
    pub host_ip: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
}

impl MockAlert {
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn service(&self) -> &'static str {
        self.tag("service").unwrap_or("Unknown Service")
    }

    pub fn component(&self) -> &'static str {
        self.tag("component").unwrap_or("Unknown Component")
    }

    /// Zabbix tag list; falls back to service/component when the alert has
    /// no tags of its own.
    pub fn zabbix_tags(&self) -> Value {
        if self.tags.is_empty() {
            return json!([
                {"tag": "service", "value": self.service()},
                {"tag": "component", "value": self.component()},
            ]);
        }
        self.tags
            .iter()
            .map(|(tag, value)| json!({"tag": tag, "value": value}))
            .collect()
    }
}

pub const MOCK_ALERTS: &[MockAlert] = &[
    MockAlert {
        description: "High response time on product catalog pages",
        priority: 3,
        host_name: "ecom-front-01",
        host_ip: "192.168.10.10",
        tags: &[
            ("service", "E-Commerce"),
            ("component", "Frontend"),
            ("impact", "high"),
            ("category", "performance"),
        ],
    },
    MockAlert {
        description: "JavaScript errors on checkout page",
        priority: 4,
        host_name: "ecom-front-02",
        host_ip: "192.168.10.11",
        tags: &[
            ("service", "E-Commerce"),
            ("component", "Frontend"),
            ("impact", "critical"),
            ("category", "functionality"),
        ],
    },
    MockAlert {
        description: "Payment gateway timeout",
        priority: 4,
        host_name: "ecom-api-01",
        host_ip: "192.168.10.20",
        tags: &[
            ("service", "E-Commerce"),
            ("component", "Backend API"),
            ("impact", "critical"),
            ("category", "availability"),
        ],
    },
    MockAlert {
        description: "Web interface session handling errors",
        priority: 4,
        host_name: "crm-web-01",
        host_ip: "192.168.20.10",
        tags: &[
            ("service", "CRM"),
            ("component", "Web Interface"),
            ("impact", "critical"),
            ("category", "functionality"),
        ],
    },
    MockAlert {
        description: "BGP session down on edge router",
        priority: 4,
        host_name: "router-edge-01",
        host_ip: "192.168.1.1",
        tags: &[
            ("service", "Network Backbone"),
            ("component", "Edge Routers"),
            ("impact", "critical"),
            ("category", "connectivity"),
        ],
    },
];
