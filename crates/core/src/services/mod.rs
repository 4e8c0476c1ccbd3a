pub mod reconcile_service;
