mod object_media_store_test;
