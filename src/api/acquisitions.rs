//! Acquisitions API (`/almaws/v1/acq`)

use super::{check_choice, get_or_list, read_list, read_one, ListOptions, ReadOptions};
use crate::error::Result;
use crate::http::{AlmaClient, Response};
use crate::types::{params, Params};

const API_URI: &str = "/almaws/v1/acq";
const WEB_DOC: &str = "https://developers.exlibrisgroup.com/alma/apis/acq";
const WADL_URL: &str =
    "https://developers.exlibrisgroup.com/resources/wadl/d5b14609-b590-470e-baba-9944682f8c7e.wadl";

/// Accepted vendor `status` filters
pub const VENDOR_STATUSES: [&str; 3] = ["active", "inactive", "ALL"];

/// Accepted vendor `type` filters
pub const VENDOR_TYPES: [&str; 5] = [
    "material_supplier",
    "access_provider",
    "licensor",
    "governmental",
    "ALL",
];

/// Accepted license `status` filters
pub const LICENSE_STATUSES: [&str; 6] = ["ACTIVE", "DELETED", "DRAFT", "EXPIRED", "RETIRED", "ALL"];

/// Funds, PO lines, vendors, invoices and licenses
#[derive(Debug, Clone)]
pub struct Acquisitions {
    pub funds: Funds,
    pub po_lines: PoLines,
    pub vendors: Vendors,
    pub invoices: Invoices,
    pub licenses: Licenses,
}

impl Acquisitions {
    pub(crate) fn new(root: &AlmaClient) -> Self {
        let params = root.params().for_api(API_URI, WEB_DOC, WADL_URL);
        Self {
            funds: Funds {
                client: root.derive(params.nested("/funds")),
            },
            po_lines: PoLines {
                client: root.derive(params.nested("/po-lines")),
            },
            vendors: Vendors {
                client: root.derive(params.nested("/vendors")),
            },
            invoices: Invoices {
                client: root.derive(params.nested("/invoices")),
            },
            licenses: Licenses {
                client: root.derive(params.nested("/licenses")),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Funds {
    client: AlmaClient,
}

impl Funds {
    /// Fund list, optionally restricted to the funds usable by one library
    pub async fn get(&self, library: Option<&str>, opts: &ListOptions) -> Result<Response> {
        let extra = library.map(|l| params([("library", l)])).unwrap_or_default();
        read_list(&self.client, self.client.params().api_uri_full(), extra, opts, "fund").await
    }
}

#[derive(Debug, Clone)]
pub struct PoLines {
    client: AlmaClient,
}

impl PoLines {
    /// A single PO line by number, or the PO line list
    pub async fn get(&self, po_line_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, po_line_id, Params::new(), opts, "po_line").await
    }

    /// Items received against a PO line
    pub async fn get_items(&self, po_line_id: &str, opts: &ReadOptions) -> Result<Response> {
        let url = format!("{}/{po_line_id}/items", self.client.params().api_uri_full());
        read_one(&self.client, &url, opts).await
    }
}

#[derive(Debug, Clone)]
pub struct Vendors {
    client: AlmaClient,
}

impl Vendors {
    /// A single vendor by code, or the vendor list filtered by status and type
    pub async fn get(
        &self,
        vendor_id: Option<&str>,
        status: &str,
        vendor_type: &str,
        opts: &ListOptions,
    ) -> Result<Response> {
        check_choice("status", status, &VENDOR_STATUSES)?;
        check_choice("type", vendor_type, &VENDOR_TYPES)?;
        let extra = params([("status", status), ("type", vendor_type)]);
        get_or_list(&self.client, vendor_id, extra, opts, "vendor").await
    }

    pub async fn get_invoices(&self, vendor_id: &str, opts: &ListOptions) -> Result<Response> {
        let url = format!("{}/{vendor_id}/invoices", self.client.params().api_uri_full());
        read_list(&self.client, &url, Params::new(), opts, "invoice").await
    }

    pub async fn get_po_lines(&self, vendor_id: &str, opts: &ListOptions) -> Result<Response> {
        let url = format!("{}/{vendor_id}/po-lines", self.client.params().api_uri_full());
        read_list(&self.client, &url, Params::new(), opts, "po_line").await
    }
}

#[derive(Debug, Clone)]
pub struct Invoices {
    client: AlmaClient,
}

impl Invoices {
    pub async fn get(&self, invoice_id: Option<&str>, opts: &ListOptions) -> Result<Response> {
        get_or_list(&self.client, invoice_id, Params::new(), opts, "invoice").await
    }
}

#[derive(Debug, Clone)]
pub struct Licenses {
    client: AlmaClient,
}

impl Licenses {
    /// A single license by code, or the license list.
    ///
    /// `review_status` takes values from the LicenseReviewStatuses code
    /// table, or `ALL`; it is passed through unchecked.
    pub async fn get(
        &self,
        license_id: Option<&str>,
        status: &str,
        review_status: &str,
        opts: &ListOptions,
    ) -> Result<Response> {
        check_choice("status", status, &LICENSE_STATUSES)?;
        let extra = params([("status", status), ("review_status", review_status)]);
        get_or_list(&self.client, license_id, extra, opts, "license").await
    }

    /// Amendments of a license, or one amendment
    pub async fn get_amendments(
        &self,
        license_id: &str,
        amendment_id: Option<&str>,
        opts: &ReadOptions,
    ) -> Result<Response> {
        let mut url = format!("{}/{license_id}/amendments", self.client.params().api_uri_full());
        if let Some(id) = amendment_id {
            url.push('/');
            url.push_str(id);
        }
        read_one(&self.client, &url, opts).await
    }
}
