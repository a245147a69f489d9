mod bundle;
mod collaborators;
mod dispatch;
mod strings;
