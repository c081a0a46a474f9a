//! The project data collaborator.
//!
//! Bound-variable fields draw their values from an external project record
//! fetched by id. The engine owns only the client side: listing projects,
//! fetching one record, and the catalog of record keys a binding may name.
//! The service's own behavior is out of scope.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::resolve::ExternalRecord;

/// The known external-record field names a bound variable can reference.
/// The first entry is the default binding for freshly created variable
/// fields.
pub const VARIABLE_CATALOG: &[&str] = &[
    "name",
    "meetingTasks",
    "organization",
    "extCustomerId",
    "scope",
    "leader",
    "deadline",
    "start",
    "end",
    "submitDrawingDeadline",
    "approvalDrawingDeadline",
    "approvalMaterialDeadline",
    "purchaseRequestDeadline",
    "scheduleArriveMaterial",
    "productionDeadline",
    "qcDeadline",
    "fatDeadline",
    "deliveryDeadline",
    "installDeadline",
    "atpDeadline",
    "grReceivedDeadline",
    "invoiceDeadline",
    "extJdpPresetId",
    "duration",
    "cost",
    "budget",
    "kickOffMeeting",
    "closing",
    "remark",
    "sequenceNumber",
    "romanNumber",
    "projectIdManual",
    "poNumber",
    "poDate",
    "poExp",
    "contractNumber",
    "contractDate",
    "contractExp",
    "hasSubSchedule",
    "hasProjectProducts",
    "projectPos",
    "projectContracts",
    "city",
    "projectDeliverables",
    "projectRisks",
    "projectTemplate",
    "projectTemplateItemProjectDeliverables",
    "projectTemplateGroup",
    "projectProducts",
    "projectProductDetails",
    "projectTemplateItemDates",
    "projectProductTemplateDates",
    "projectProductDetailDates",
    "projectProjectTemplateSubScheduleDates",
    "projectStakeholders",
    "projectCommunicationModes",
    "projectExcelFiles",
    "projectCostAccumulationItems",
    "projectStakeholderPics",
    "top",
    "subProjects",
    "projectNote",
    "extPurchaseOrderId",
    "projectProductBatches",
    "projectPurchaseOrders",
    "projectProjectDocumentMasterTemplates",
    "projectBPOs",
    "objective",
    "deliverables",
    "constraints",
    "keyStakeholders",
    "communicationPlan",
    "riskManagementPlan",
    "resourceAllocation",
    "projectType",
    "id",
    "uuid",
    "ordering",
    "hidden",
    "createdAt",
    "updatedAt",
    "extCreatedById",
];

/// One entry of the project listing. Records carry more keys; the listing
/// only needs these two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
}

/// Read access to the project data service.
pub trait ProjectDirectory {
    fn list_projects(&self) -> Result<Vec<ProjectSummary>, Error>;

    fn fetch_project(&self, id: &str) -> Result<ExternalRecord, Error>;
}

/// HTTP client for the project data service.
///
/// `GET {base}/external-projects` lists projects;
/// `GET {base}/external-projects/{id}` fetches one full record. Non-2xx
/// responses carry a JSON body with a `detail` message, surfaced as
/// [`Error::Service`].
pub struct HttpProjectDirectory {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    detail: String,
}

impl HttpProjectDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ServiceErrorBody>()
                .map(|body| body.detail)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(Error::Service { detail });
        }
        Ok(response.json()?)
    }
}

impl ProjectDirectory for HttpProjectDirectory {
    fn list_projects(&self) -> Result<Vec<ProjectSummary>, Error> {
        self.get_json("external-projects")
    }

    fn fetch_project(&self, id: &str) -> Result<ExternalRecord, Error> {
        self.get_json(&format!("external-projects/{id}"))
    }
}
